//! CUDA Client implementation
//!
//! CudaClient owns stream and context for direct cudarc access.
//!
//! # Thread Safety
//!
//! `CudaClient` is `Clone` and can be shared across threads. The underlying
//! CUDA context and stream are reference-counted via `Arc`. However, CUDA
//! operations must be performed on the thread that owns the context or after
//! calling `context.bind_to_thread()`.

use cudarc::driver::safe::{CudaContext, CudaStream};
use cudarc::driver::sys::CUresult;
use std::sync::Arc;

use super::CudaRuntime;
use super::cache::free_device_memory;
use super::device::CudaDevice;
use crate::error::{Error, Result};
use crate::runtime::error_flag::ErrorFlag;
use crate::runtime::{Allocator, DeviceLimits, RuntimeClient};

// ============================================================================
// CudaClient
// ============================================================================

/// CUDA Runtime Client
///
/// Owns CUDA context and stream for direct kernel launches.
/// All copy kernels launch on this stream.
///
/// # Stream Ownership
///
/// All kernels MUST launch on `self.stream()` for correct ordering.
/// Copies launched on different clients may execute out of order.
#[derive(Clone)]
pub struct CudaClient {
    /// GPU device index
    pub(crate) device: CudaDevice,

    /// CUDA context for this device (owns GPU context)
    pub(crate) context: Arc<CudaContext>,

    /// Stream on which all kernels launch
    pub(crate) stream: Arc<CudaStream>,

    /// Launch limits queried once at creation
    pub(crate) limits: DeviceLimits,

    /// Launches rejected by the driver, reported by `check_last_error`
    pub(crate) last_error: ErrorFlag,

    /// Allocator for memory management
    pub(crate) allocator: CudaAllocator,
}

impl std::fmt::Debug for CudaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CudaClient")
            .field("device", &self.device)
            .field("limits", &self.limits)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// CudaAllocator
// ============================================================================

/// CUDA allocator that uses stream-ordered allocation.
///
/// This allocator uses `cuMemAllocAsync` and `cuMemFreeAsync`, so memory
/// operations are ordered with kernel execution on the associated stream.
#[derive(Clone)]
pub struct CudaAllocator {
    stream: Arc<CudaStream>,
}

impl Allocator for CudaAllocator {
    fn allocate(&self, size_bytes: usize) -> Result<u64> {
        if size_bytes == 0 {
            return Ok(0);
        }

        let mut ptr: u64 = 0;
        // SAFETY: `ptr` is a valid out-parameter and the stream is alive.
        let result = unsafe {
            cudarc::driver::sys::cuMemAllocAsync(&mut ptr, size_bytes, self.stream.cu_stream())
        };

        if result != CUresult::CUDA_SUCCESS {
            tracing::error!(size_bytes, ?result, "cuMemAllocAsync failed");
            return Err(Error::OutOfMemory { size: size_bytes });
        }
        Ok(ptr)
    }

    fn deallocate(&self, ptr: u64, _size_bytes: usize) {
        free_device_memory(ptr, Some(self.stream.cu_stream()));
    }
}

// ============================================================================
// CudaClient Implementation
// ============================================================================

impl CudaClient {
    /// Create a new CUDA client for a device.
    ///
    /// This initializes the CUDA context, creates a stream, and reads the
    /// device's launch limits.
    ///
    /// # Errors
    ///
    /// Returns an error if context or stream creation fails (e.g., invalid
    /// device index) or the limits cannot be queried.
    pub fn new(device: CudaDevice) -> Result<Self> {
        let context = CudaContext::new(device.index)?;
        context.bind_to_thread()?;
        let stream = context.new_stream()?;
        let limits = device.query_limits()?;

        tracing::debug!(
            device = device.index,
            max_threads = limits.max_threads_per_group,
            max_groups = limits.max_groups,
            "created CUDA client"
        );

        let allocator = CudaAllocator {
            stream: stream.clone(),
        };

        Ok(Self {
            device,
            context,
            stream,
            limits,
            last_error: ErrorFlag::default(),
            allocator,
        })
    }

    /// Get reference to the CUDA stream.
    ///
    /// All kernel launches MUST use this stream for correct ordering.
    #[inline]
    pub fn stream(&self) -> &CudaStream {
        &self.stream
    }

    /// Get reference to the CUDA context.
    #[inline]
    pub fn context(&self) -> &Arc<CudaContext> {
        &self.context
    }
}

impl RuntimeClient<CudaRuntime> for CudaClient {
    fn device(&self) -> &CudaDevice {
        &self.device
    }

    fn synchronize(&self) -> Result<()> {
        self.stream.synchronize()?;
        Ok(())
    }

    fn allocator(&self) -> &CudaAllocator {
        &self.allocator
    }
}
