//! WebGPU runtime implementation

use super::cache::get_or_create_client;
use super::client::{WgpuAllocator, WgpuClient, require_buffer};
use super::device::{WgpuDevice, query_adapter_info_blocking};
use crate::error::Result;
use crate::runtime::{Allocator, Runtime};

/// WebGPU Runtime adapter
///
/// Implements the generic Runtime trait for the WebGPU backend.
#[derive(Clone, Debug, Default)]
pub struct WgpuRuntime;

impl Runtime for WgpuRuntime {
    type Device = WgpuDevice;
    type Client = WgpuClient;
    type Allocator = WgpuAllocator;

    fn name() -> &'static str {
        "wgpu"
    }

    fn allocate(size_bytes: usize, device: &Self::Device) -> Result<u64> {
        if size_bytes == 0 {
            return Ok(0);
        }
        get_or_create_client(device)?.allocator.allocate(size_bytes)
    }

    fn deallocate(ptr: u64, size_bytes: usize, device: &Self::Device) {
        if ptr == 0 {
            return;
        }
        match get_or_create_client(device) {
            Ok(client) => client.allocator.deallocate(ptr, size_bytes),
            Err(e) => tracing::warn!(handle = ptr, error = %e, "WebGPU deallocate without client"),
        }
    }

    /// Copy data from host to device.
    ///
    /// Queue writes are ordered after copies already submitted.
    fn copy_to_device(src: &[u8], dst: u64, device: &Self::Device) -> Result<()> {
        if src.is_empty() || dst == 0 {
            return Ok(());
        }

        let client = get_or_create_client(device)?;
        let buffer = require_buffer(dst, "dst")?;

        // write_buffer needs a multiple of 4 bytes. Every element type is a
        // whole number of u32 units, so only raw byte writes get zero padding.
        if src.len() % wgpu::COPY_BUFFER_ALIGNMENT as usize == 0 {
            client.queue.write_buffer(&buffer, 0, src);
        } else {
            let mut padded = src.to_vec();
            padded.resize(src.len().next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT as usize), 0);
            client.queue.write_buffer(&buffer, 0, &padded);
        }
        client.queue.submit(std::iter::empty());
        client.wait_idle()
    }

    /// Copy data from device to host after submitted work completes.
    fn copy_from_device(src: u64, dst: &mut [u8], device: &Self::Device) -> Result<()> {
        if dst.is_empty() || src == 0 {
            return Ok(());
        }

        let client = get_or_create_client(device)?;
        let buffer = require_buffer(src, "src")?;

        let size = (dst.len() as u64).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);
        let staging = client.create_staging_buffer("copy_from_device", size);

        let mut encoder =
            client
                .wgpu_device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("copy_from_device"),
                });
        encoder.copy_buffer_to_buffer(&buffer, 0, &staging, 0, size);
        client.queue.submit(std::iter::once(encoder.finish()));

        client.read_staging(&staging, dst)
    }

    /// Buffer handles always address the start of a wide-word padded buffer.
    fn is_wide_aligned(_ptr: u64) -> bool {
        true
    }

    fn default_device() -> Self::Device {
        WgpuDevice::new(0)
    }

    fn default_client(device: &Self::Device) -> Result<Self::Client> {
        get_or_create_client(device)
    }
}

/// Get the default WebGPU device (first adapter)
pub fn wgpu_device() -> WgpuDevice {
    WgpuDevice::new(0)
}

/// Get a specific WebGPU device by adapter index
pub fn wgpu_device_id(index: usize) -> WgpuDevice {
    WgpuDevice::new(index)
}

/// Check if WebGPU is available on this system
pub fn is_wgpu_available() -> bool {
    query_adapter_info_blocking(0).is_ok()
}
