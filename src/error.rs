//! Error types for gpucopy

use crate::dtype::DType;
use thiserror::Error;

/// Result type alias using gpucopy's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while enqueueing copies or managing device memory
#[derive(Error, Debug)]
pub enum Error {
    /// The device rejected a kernel launch.
    ///
    /// Surfaced by the dispatch entry points right after enqueue. Retrying
    /// with the same geometry fails identically, so callers should treat
    /// this as fatal.
    #[error("{backend} kernel '{kernel}' launch failed: {reason}")]
    LaunchFailed {
        /// Backend that rejected the launch
        backend: &'static str,
        /// Kernel that was being enqueued
        kernel: String,
        /// Backend-provided reason
        reason: String,
    },

    /// Launch geometry exceeds the device limits
    #[error(
        "Invalid launch geometry: {groups} groups x {threads_per_group} threads (limits: {max_groups} groups, {max_threads_per_group} threads)"
    )]
    InvalidGeometry {
        /// Requested group count
        groups: usize,
        /// Requested threads per group
        threads_per_group: u32,
        /// Device maximum group count
        max_groups: usize,
        /// Device maximum threads per group
        max_threads_per_group: u32,
    },

    /// Buffer holds fewer elements than the copy requires
    #[error("Buffer too small: copy needs {needed} elements, buffer holds {len}")]
    BufferTooSmall {
        /// Elements required by the copy
        needed: usize,
        /// Elements held by the buffer
        len: usize,
    },

    /// Buffer does not satisfy the alignment a strategy requires
    #[error("Buffer at 0x{ptr:x} is not aligned to {align} bytes")]
    Misaligned {
        /// Device pointer
        ptr: u64,
        /// Required alignment in bytes
        align: usize,
    },

    /// Unsupported dtype for an operation
    #[error("Unsupported dtype {dtype:?} for operation '{op}'")]
    UnsupportedDType {
        /// The unsupported dtype
        dtype: DType,
        /// The operation name
        op: &'static str,
    },

    /// DType mismatch between source and destination
    #[error("DType mismatch: {lhs:?} vs {rhs:?}")]
    DTypeMismatch {
        /// Source dtype
        lhs: DType,
        /// Destination dtype
        rhs: DType,
    },

    /// Device mismatch between operands
    #[error("Device mismatch: buffers must live on the same device")]
    DeviceMismatch,

    /// Out of memory
    #[error("Out of memory: failed to allocate {size} bytes")]
    OutOfMemory {
        /// Requested size in bytes
        size: usize,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Backend-specific error
    #[error("Backend error: {0}")]
    Backend(String),

    /// Backend limitation - operation valid but exceeds backend capabilities
    #[error("{backend} limitation: {operation} - {reason}")]
    BackendLimitation {
        /// The backend that has the limitation
        backend: &'static str,
        /// The operation being attempted
        operation: &'static str,
        /// Description of the limitation
        reason: String,
    },

    /// CUDA driver error
    #[cfg(feature = "cuda")]
    #[error("CUDA error: {0}")]
    Cuda(#[from] cudarc::driver::DriverError),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a launch failure error
    pub fn launch_failed(
        backend: &'static str,
        kernel: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::LaunchFailed {
            backend,
            kernel: kernel.into(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported dtype error
    pub fn unsupported_dtype(dtype: DType, op: &'static str) -> Self {
        Self::UnsupportedDType { dtype, op }
    }

    /// Create a backend limitation error
    pub fn backend_limitation(
        backend: &'static str,
        operation: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::BackendLimitation {
            backend,
            operation,
            reason: reason.into(),
        }
    }

    /// Returns true if this error reports a rejected kernel launch
    pub fn is_launch_failure(&self) -> bool {
        matches!(self, Self::LaunchFailed { .. })
    }
}
