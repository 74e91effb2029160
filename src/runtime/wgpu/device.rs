//! WebGPU device implementation.
//!
//! `WgpuDevice` identifies an adapter by enumeration order and, once a
//! client has been created for it, caches the adapter's properties.

use std::fmt;
use std::sync::Arc;
use wgpu::{Adapter, Backend, Limits};

use crate::error::{Error, Result};
use crate::runtime::{Device, DeviceLimits};

/// Cached adapter information for a WebGPU device.
#[derive(Clone)]
pub(crate) struct AdapterInfo {
    /// Adapter name (e.g., "NVIDIA GeForce RTX 4090")
    name: String,
    /// Backend type (Vulkan, Metal, DX12, etc.)
    backend: Backend,
    /// Device limits
    limits: Limits,
}

/// WebGPU device identifier.
///
/// The device index maps to the order of adapters returned by WebGPU
/// enumeration.
///
/// # Example
///
/// ```ignore
/// let device = WgpuDevice::new(0);  // First adapter
/// println!("Device: {}", device.name());
/// ```
#[derive(Clone)]
pub struct WgpuDevice {
    /// Device index (adapter order)
    pub(crate) index: usize,
    /// Cached adapter info (populated by client creation)
    info: Option<Arc<AdapterInfo>>,
}

impl WgpuDevice {
    /// Create a device identifier for the specified adapter index.
    ///
    /// This does not initialize the GPU; that happens when a client is
    /// created.
    pub fn new(index: usize) -> Self {
        Self { index, info: None }
    }

    pub(crate) fn with_info(index: usize, info: Arc<AdapterInfo>) -> Self {
        Self {
            index,
            info: Some(info),
        }
    }

    /// Get the adapter name.
    ///
    /// Returns "unknown" if the device hasn't been initialized yet.
    pub fn adapter_name(&self) -> String {
        self.info
            .as_ref()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Get the backend type (Vulkan, Metal, DX12, etc.).
    pub fn backend(&self) -> Option<Backend> {
        self.info.as_ref().map(|i| i.backend)
    }

    /// Get the adapter's wgpu limits, or the WebGPU defaults before
    /// initialization.
    pub fn wgpu_limits(&self) -> Limits {
        self.info
            .as_ref()
            .map(|i| i.limits.clone())
            .unwrap_or_default()
    }
}

/// Launch limits implied by a set of wgpu limits.
pub(crate) fn copy_limits(limits: &Limits) -> DeviceLimits {
    DeviceLimits {
        max_threads_per_group: limits
            .max_compute_workgroup_size_x
            .min(limits.max_compute_invocations_per_workgroup),
        max_groups: limits.max_compute_workgroups_per_dimension as usize,
    }
}

impl Device for WgpuDevice {
    fn id(&self) -> usize {
        self.index
    }

    fn name(&self) -> String {
        format!("wgpu:{}", self.index)
    }

    fn limits(&self) -> DeviceLimits {
        copy_limits(&self.wgpu_limits())
    }
}

impl fmt::Debug for WgpuDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WgpuDevice")
            .field("index", &self.index)
            .field("adapter", &self.adapter_name())
            .field("backend", &self.backend())
            .finish()
    }
}

// ============================================================================
// Adapter Discovery
// ============================================================================

/// Request the adapter at `index`, falling back to the high-performance
/// adapter when the index is out of range.
pub(crate) async fn query_adapter_info(index: usize) -> Result<(Adapter, Arc<AdapterInfo>)> {
    let instance = wgpu::Instance::default();
    let mut adapters: Vec<_> = instance.enumerate_adapters(wgpu::Backends::all()).await;

    let adapter = if index < adapters.len() {
        adapters.swap_remove(index)
    } else {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| Error::Backend(format!("No suitable WebGPU adapter found: {e}")))?
    };

    let wgpu_info = adapter.get_info();
    let info = Arc::new(AdapterInfo {
        name: wgpu_info.name,
        backend: wgpu_info.backend,
        limits: adapter.limits(),
    });

    Ok((adapter, info))
}

/// Query adapter information synchronously using pollster.
pub(crate) fn query_adapter_info_blocking(index: usize) -> Result<(Adapter, Arc<AdapterInfo>)> {
    pollster::block_on(query_adapter_info(index))
}
