//! Default CUDA streams, one per device
//!
//! `CudaRuntime` orders allocation, transfers and frees against the client
//! cached here. Clients created with `CudaClient::new` get their own stream.

use super::client::CudaClient;
use super::device::CudaDevice;
use crate::error::Result;
use cudarc::driver::sys::{self, CUresult, CUstream};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Device ordinal -> client owning that device's default stream
static DEFAULT_CLIENTS: OnceLock<Mutex<HashMap<usize, CudaClient>>> = OnceLock::new();

/// Client owning the default stream of `device`, created on first use.
pub(super) fn default_stream_client(device: &CudaDevice) -> Result<CudaClient> {
    let mut clients = DEFAULT_CLIENTS.get_or_init(Default::default).lock();
    if let Some(client) = clients.get(&device.index) {
        return Ok(client.clone());
    }
    let client = CudaClient::new(device.clone())?;
    clients.insert(device.index, client.clone());
    Ok(client)
}

/// Raw default stream of a device, if its client exists.
pub(super) fn default_stream(device_index: usize) -> Option<CUstream> {
    DEFAULT_CLIENTS
        .get()?
        .lock()
        .get(&device_index)
        .map(|client| client.stream.cu_stream())
}

/// Free `ptr`, ordered on `stream` when one is given.
///
/// Frees run from `Drop`, so failures are logged rather than returned. With
/// no current context the driver has already reclaimed the memory.
pub(super) fn free_device_memory(ptr: u64, stream: Option<CUstream>) {
    if ptr == 0 {
        return;
    }

    let mut ctx: sys::CUcontext = std::ptr::null_mut();
    // SAFETY: cuCtxGetCurrent only writes the out-parameter.
    let bound = unsafe { sys::cuCtxGetCurrent(&mut ctx) } == CUresult::CUDA_SUCCESS;
    if !bound || ctx.is_null() {
        return;
    }

    // SAFETY: `ptr` came from cuMemAlloc* and its owner no longer uses it.
    let result = unsafe {
        match stream {
            Some(stream) => sys::cuMemFreeAsync(ptr, stream),
            None => sys::cuMemFree_v2(ptr),
        }
    };
    if !matches!(
        result,
        CUresult::CUDA_SUCCESS | CUresult::CUDA_ERROR_ILLEGAL_ADDRESS
    ) {
        tracing::warn!(ptr, ?result, "freeing CUDA memory failed");
    }
}
