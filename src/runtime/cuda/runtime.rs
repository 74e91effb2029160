//! CUDA runtime implementation

use super::cache::{default_stream, default_stream_client, free_device_memory};
use super::client::{CudaAllocator, CudaClient};
use super::device::CudaDevice;
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use cudarc::driver::sys::CUresult;

/// CUDA Runtime adapter
///
/// Implements the generic Runtime trait for CUDA backend.
/// Uses cudarc for direct GPU control.
#[derive(Clone, Debug, Default)]
pub struct CudaRuntime;

impl Runtime for CudaRuntime {
    type Device = CudaDevice;
    type Client = CudaClient;
    type Allocator = CudaAllocator;

    fn name() -> &'static str {
        "cuda"
    }

    /// Allocate GPU memory on the device's default stream.
    ///
    /// Returns `Err(OutOfMemory)` if CUDA memory allocation fails.
    fn allocate(size_bytes: usize, device: &Self::Device) -> Result<u64> {
        if size_bytes == 0 {
            return Ok(0);
        }

        let client = default_stream_client(device)?;

        unsafe {
            let mut ptr: u64 = 0;
            let result = cudarc::driver::sys::cuMemAllocAsync(
                &mut ptr,
                size_bytes,
                client.stream.cu_stream(),
            );
            if result == CUresult::CUDA_SUCCESS {
                return Ok(ptr);
            }

            // Flush pending stream-ordered frees and retry once
            client.stream.synchronize()?;
            let result = cudarc::driver::sys::cuMemAllocAsync(
                &mut ptr,
                size_bytes,
                client.stream.cu_stream(),
            );
            if result == CUresult::CUDA_SUCCESS {
                return Ok(ptr);
            }

            tracing::error!(size_bytes, device = device.index, ?result, "CUDA allocation failed");
            Err(Error::OutOfMemory { size: size_bytes })
        }
    }

    fn deallocate(ptr: u64, _size_bytes: usize, device: &Self::Device) {
        free_device_memory(ptr, default_stream(device.index));
    }

    /// Copy data from host to device, ordered after work on the default
    /// stream.
    fn copy_to_device(src: &[u8], dst: u64, device: &Self::Device) -> Result<()> {
        if src.is_empty() || dst == 0 {
            return Ok(());
        }

        let client = default_stream_client(device)?;

        unsafe {
            let result = cudarc::driver::sys::cuMemcpyHtoDAsync_v2(
                dst,
                src.as_ptr() as *const std::ffi::c_void,
                src.len(),
                client.stream.cu_stream(),
            );

            if result != CUresult::CUDA_SUCCESS {
                return Err(Error::Backend(format!(
                    "CUDA host-to-device copy failed: {} bytes ({:?})",
                    src.len(),
                    result
                )));
            }
        }

        // `src` is only borrowed for this call
        client.stream.synchronize()?;
        Ok(())
    }

    /// Copy data from device to host after the default stream drains.
    fn copy_from_device(src: u64, dst: &mut [u8], device: &Self::Device) -> Result<()> {
        if dst.is_empty() || src == 0 {
            return Ok(());
        }

        let client = default_stream_client(device)?;

        unsafe {
            let result = cudarc::driver::sys::cuMemcpyDtoHAsync_v2(
                dst.as_mut_ptr() as *mut std::ffi::c_void,
                src,
                dst.len(),
                client.stream.cu_stream(),
            );

            if result != CUresult::CUDA_SUCCESS {
                return Err(Error::Backend(format!(
                    "CUDA device-to-host copy failed: {} bytes ({:?})",
                    dst.len(),
                    result
                )));
            }
        }

        client.stream.synchronize()?;
        Ok(())
    }

    fn default_device() -> Self::Device {
        CudaDevice::new(0)
    }

    fn default_client(device: &Self::Device) -> Result<Self::Client> {
        default_stream_client(device)
    }
}

/// Get the default CUDA device (device 0)
pub fn cuda_device() -> CudaDevice {
    CudaDevice::new(0)
}

/// Get a specific CUDA device by ID
pub fn cuda_device_id(device_id: usize) -> CudaDevice {
    CudaDevice::new(device_id)
}

/// Check if CUDA is available on this system
///
/// With dynamic loading, a missing driver library surfaces as a panic inside
/// cudarc; it is caught here and reported as "unavailable".
pub fn is_cuda_available() -> bool {
    std::panic::catch_unwind(|| default_stream_client(&CudaDevice::new(0)).is_ok())
        .unwrap_or(false)
}
