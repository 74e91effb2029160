//! WebGPU Client implementation.
//!
//! `WgpuClient` owns the WebGPU device and queue. Its queue is the stream
//! all copies are submitted to.
//!
//! # Thread Safety
//!
//! `WgpuClient` is `Clone`; wgpu::Device and wgpu::Queue are `Send + Sync`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use wgpu::{Buffer, BufferDescriptor, BufferUsages, Device, Queue};

use super::WgpuRuntime;
use super::device::{WgpuDevice, copy_limits, query_adapter_info_blocking};
use super::shaders::PipelineCache;
use crate::dtype::WIDE_WORD_BYTES;
use crate::error::{Error, Result};
use crate::runtime::error_flag::ErrorFlag;
use crate::runtime::{Allocator, DeviceLimits, RuntimeClient};

/// Upper bound on a blocking wait for the queue
const WAIT_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// WgpuClient
// ============================================================================

/// WebGPU Runtime Client.
///
/// Buffers are storage buffers identified by registry handles (see
/// [`WgpuAllocator`]); the `src`/`dst` arguments of the copy entry points
/// are those handles, and every copy starts at offset zero.
#[derive(Clone)]
pub struct WgpuClient {
    /// GPU device identifier
    pub(crate) device_id: WgpuDevice,

    /// WebGPU device handle
    pub(crate) wgpu_device: Arc<Device>,

    /// WebGPU queue for command submission
    pub(crate) queue: Arc<Queue>,

    /// Launch limits derived from the adapter
    pub(crate) limits: DeviceLimits,

    /// Launches rejected before submission
    pub(crate) last_error: ErrorFlag,

    /// Allocator for buffer management
    pub(crate) allocator: WgpuAllocator,

    /// Pipeline cache for the copy shaders
    pub(crate) pipeline_cache: Arc<PipelineCache>,
}

impl std::fmt::Debug for WgpuClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WgpuClient")
            .field("device", &self.device_id)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl WgpuClient {
    /// Create a new WebGPU client for a device.
    ///
    /// The client gets its own `wgpu::Device`. Buffers allocated through
    /// [`WgpuRuntime`] belong to the cached default client, so copy them with
    /// `WgpuRuntime::default_client` instead.
    ///
    /// # Errors
    ///
    /// Returns an error if no adapter is found or device creation fails.
    pub fn new(device: WgpuDevice) -> Result<Self> {
        let (adapter, info) = query_adapter_info_blocking(device.index)?;
        let required_limits = adapter.limits();

        let (wgpu_device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("gpucopy WebGPU Device"),
                required_features: wgpu::Features::empty(),
                required_limits: required_limits.clone(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
                experimental_features: wgpu::ExperimentalFeatures::default(),
            },
        ))
        .map_err(|e| Error::Backend(format!("WebGPU device request failed: {e}")))?;

        let wgpu_device = Arc::new(wgpu_device);
        let queue = Arc::new(queue);
        let limits = copy_limits(&required_limits);
        let device_id = WgpuDevice::with_info(device.index, info);

        tracing::debug!(
            device = device.index,
            adapter = %device_id.adapter_name(),
            max_groups = limits.max_groups,
            "created WebGPU client"
        );

        Ok(Self {
            device_id,
            allocator: WgpuAllocator {
                device: wgpu_device.clone(),
            },
            pipeline_cache: Arc::new(PipelineCache::new(wgpu_device.clone())),
            wgpu_device,
            queue,
            limits,
            last_error: ErrorFlag::default(),
        })
    }

    /// Get reference to the WebGPU device.
    #[inline]
    pub fn wgpu_device(&self) -> &Device {
        &self.wgpu_device
    }

    /// Get reference to the WebGPU queue.
    #[inline]
    pub fn wgpu_queue(&self) -> &Queue {
        &self.queue
    }

    /// Create a staging buffer for CPU readback.
    pub(crate) fn create_staging_buffer(&self, label: &str, size: u64) -> Buffer {
        self.wgpu_device.create_buffer(&BufferDescriptor {
            label: Some(label),
            size,
            usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Block until all submitted work has completed.
    pub(crate) fn wait_idle(&self) -> Result<()> {
        self.wgpu_device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: Some(WAIT_TIMEOUT),
            })
            .map_err(|e| Error::Backend(format!("GPU poll failed: {e}")))?;
        Ok(())
    }

    /// Read a staging buffer back to the host (blocking).
    pub(crate) fn read_staging(&self, staging: &Buffer, output: &mut [u8]) -> Result<()> {
        let slice = staging.slice(..);

        let (sender, receiver) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        self.wait_idle()?;

        receiver
            .recv()
            .map_err(|_| Error::Backend("map_async callback was not invoked".into()))?
            .map_err(|e| Error::Backend(format!("map_async failed: {e}")))?;

        {
            let data = slice.get_mapped_range();
            output.copy_from_slice(&data[..output.len()]);
        }

        staging.unmap();
        Ok(())
    }
}

impl RuntimeClient<WgpuRuntime> for WgpuClient {
    fn device(&self) -> &WgpuDevice {
        &self.device_id
    }

    fn synchronize(&self) -> Result<()> {
        self.wait_idle()
    }

    fn allocator(&self) -> &WgpuAllocator {
        &self.allocator
    }
}

// ============================================================================
// WgpuAllocator
// ============================================================================

/// WebGPU buffer allocator.
///
/// WebGPU doesn't expose raw pointers, so allocations are storage buffers
/// registered under a non-zero u64 handle. Sizes are rounded up to a whole
/// wide word so the vector shaders can bind them as `array<vec4<u32>>`.
#[derive(Clone)]
pub struct WgpuAllocator {
    device: Arc<Device>,
}

/// Global buffer registry mapping handles to buffers.
static BUFFER_REGISTRY: OnceLock<parking_lot::Mutex<HashMap<u64, Arc<Buffer>>>> =
    OnceLock::new();

/// Counter for generating unique buffer handles.
static BUFFER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

fn get_buffer_registry() -> &'static parking_lot::Mutex<HashMap<u64, Arc<Buffer>>> {
    BUFFER_REGISTRY.get_or_init(|| parking_lot::Mutex::new(HashMap::new()))
}

/// Get a buffer by its handle.
pub(crate) fn get_buffer(id: u64) -> Option<Arc<Buffer>> {
    if id == 0 {
        return None;
    }
    get_buffer_registry().lock().get(&id).cloned()
}

/// Look up a buffer, reporting a missing one as an invalid argument.
pub(crate) fn require_buffer(id: u64, arg: &'static str) -> Result<Arc<Buffer>> {
    get_buffer(id).ok_or_else(|| Error::InvalidArgument {
        arg,
        reason: format!("no WebGPU buffer registered under handle {id}"),
    })
}

impl Allocator for WgpuAllocator {
    fn allocate(&self, size_bytes: usize) -> Result<u64> {
        if size_bytes == 0 {
            return Ok(0);
        }

        let aligned_size = size_bytes.div_ceil(WIDE_WORD_BYTES) * WIDE_WORD_BYTES;
        let buffer = self.device.create_buffer(&BufferDescriptor {
            label: Some("gpucopy buffer"),
            size: aligned_size as u64,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_DST | BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let id = BUFFER_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        get_buffer_registry().lock().insert(id, Arc::new(buffer));
        Ok(id)
    }

    fn deallocate(&self, ptr: u64, _size_bytes: usize) {
        if ptr == 0 {
            return;
        }
        // Dropping the last Arc releases GPU memory
        if get_buffer_registry().lock().remove(&ptr).is_none() {
            tracing::warn!(handle = ptr, "deallocating unknown WebGPU buffer");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Device as _;

    #[test]
    fn test_wgpu_allocator() {
        let client = match WgpuClient::new(WgpuDevice::new(0)) {
            Ok(client) => client,
            Err(e) => {
                println!("No GPU available, skipping test: {}", e);
                return;
            }
        };
        assert_eq!(client.device().id(), 0);

        let allocator = client.allocator();
        let id = allocator.allocate(20).expect("allocation should succeed");
        assert_ne!(id, 0);
        let buffer = get_buffer(id).expect("buffer registered");
        assert_eq!(buffer.size(), 32);

        allocator.deallocate(id, 20);
        assert!(get_buffer(id).is_none());
        assert!(require_buffer(id, "src").is_err());
    }
}
