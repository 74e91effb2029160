//! CPU runtime implementation

use super::cache::{cached_clients, get_or_create_client};
use super::client::{CpuAllocator, CpuClient};
use super::device::CpuDevice;
use crate::error::{Error, Result};
use crate::runtime::{Runtime, RuntimeClient};
use std::alloc::{Layout as AllocLayout, alloc_zeroed, dealloc};

/// Alignment of every CPU device allocation (a multiple of the wide word)
const ALLOC_ALIGN: usize = 64;

/// CPU compute runtime
///
/// This is the default runtime that works on any platform.
/// Memory is allocated on the heap using the system allocator.
#[derive(Clone, Debug, Default)]
pub struct CpuRuntime;

impl Runtime for CpuRuntime {
    type Device = CpuDevice;
    type Client = CpuClient;
    type Allocator = CpuAllocator;

    fn name() -> &'static str {
        "cpu"
    }

    fn allocate(size_bytes: usize, device: &Self::Device) -> Result<u64> {
        cpu_allocate(size_bytes, device)
    }

    fn deallocate(ptr: u64, size_bytes: usize, device: &Self::Device) {
        cpu_deallocate(ptr, size_bytes, device)
    }

    fn copy_to_device(src: &[u8], dst: u64, device: &Self::Device) -> Result<()> {
        if src.is_empty() {
            return Ok(());
        }
        if dst == 0 {
            return Err(Error::InvalidArgument {
                arg: "dst",
                reason: "null device pointer".to_string(),
            });
        }
        drain_default_stream(device)?;

        unsafe {
            std::ptr::copy_nonoverlapping(src.as_ptr(), dst as *mut u8, src.len());
        }
        Ok(())
    }

    fn copy_from_device(src: u64, dst: &mut [u8], device: &Self::Device) -> Result<()> {
        if dst.is_empty() {
            return Ok(());
        }
        if src == 0 {
            return Err(Error::InvalidArgument {
                arg: "src",
                reason: "null device pointer".to_string(),
            });
        }
        drain_default_stream(device)?;

        unsafe {
            std::ptr::copy_nonoverlapping(src as *const u8, dst.as_mut_ptr(), dst.len());
        }
        Ok(())
    }

    fn default_device() -> Self::Device {
        CpuDevice::new()
    }

    fn default_client(device: &Self::Device) -> Result<Self::Client> {
        Ok(get_or_create_client(device))
    }
}

/// Wait for every default stream that can touch `device`'s memory.
fn drain_default_stream(device: &CpuDevice) -> Result<()> {
    cached_clients(device)
        .iter()
        .try_for_each(|client| client.synchronize())
}

pub(super) fn cpu_allocate(size_bytes: usize, _device: &CpuDevice) -> Result<u64> {
    if size_bytes == 0 {
        return Ok(0);
    }

    let layout = AllocLayout::from_size_align(size_bytes, ALLOC_ALIGN)
        .map_err(|_| Error::OutOfMemory { size: size_bytes })?;

    let ptr = unsafe { alloc_zeroed(layout) };
    if ptr.is_null() {
        return Err(Error::OutOfMemory { size: size_bytes });
    }

    Ok(ptr as u64)
}

pub(super) fn cpu_deallocate(ptr: u64, size_bytes: usize, _device: &CpuDevice) {
    if ptr == 0 || size_bytes == 0 {
        return;
    }

    match AllocLayout::from_size_align(size_bytes, ALLOC_ALIGN) {
        Ok(layout) => unsafe { dealloc(ptr as *mut u8, layout) },
        Err(_) => tracing::warn!(ptr, size_bytes, "cpu deallocate: invalid layout, leaking"),
    }
}
