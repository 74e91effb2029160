//! # gpucopy
//!
//! **Portable device-to-device memory copy kernels for Rust.**
//!
//! gpucopy copies `n` elements from one device buffer to another using one
//! of three kernel strategies, with the same API across an emulated CPU
//! device, CUDA, and WebGPU:
//!
//! - **Scalar**: one element per thread-step, grid-stride. Any type, any
//!   alignment.
//! - **Vector**: one 16-byte wide word per thread-step, then a scalar pass
//!   over the remainder. Needs 16-byte aligned buffers.
//! - **Register-blocked**: each thread-step loads `K` float4 words into a
//!   register array before storing any of them. `f32` only.
//!
//! Launches are asynchronous: an entry point returns once the kernel is
//! enqueued on the client's stream and the stream's launch error flag has
//! been checked.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gpucopy::prelude::*;
//!
//! let device = CpuRuntime::default_device();
//! let client = CpuRuntime::default_client(&device)?;
//!
//! let src = DeviceBuffer::<CpuRuntime>::from_slice(&[1.0f32; 1024], &device)?;
//! let dst = DeviceBuffer::<CpuRuntime>::zeros(1024, DType::F32, &device)?;
//!
//! // Raw, asynchronous entry point
//! unsafe { memcpy::memcpy_float::<CpuRuntime>(&client, 1024, src.ptr(), dst.ptr())? };
//! client.synchronize()?;
//!
//! // Checked, blocking API
//! copy_buffer(&client, &src, &dst, 1024)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `cpu` (default): emulated CPU device
//! - `rayon` (default): run the groups of a CPU launch in parallel
//! - `cuda`: NVIDIA CUDA backend
//! - `wgpu`: Cross-platform GPU via WebGPU

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod buffer;
pub mod dtype;
pub mod error;
pub mod ops;
pub mod runtime;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::buffer::{DeviceBuffer, copy_buffer, copy_buffer_with};
    pub use crate::dtype::{DType, Element};
    pub use crate::error::{Error, Result};
    pub use crate::ops::memcpy;
    pub use crate::ops::{BlockedVariant, CopyKernels, CopyStrategy, LaunchGeometry};
    pub use crate::runtime::{Device, Runtime, RuntimeClient};

    pub use crate::runtime::cpu::CpuRuntime;

    #[cfg(feature = "cuda")]
    pub use crate::runtime::cuda::CudaRuntime;

    #[cfg(feature = "wgpu")]
    pub use crate::runtime::wgpu::WgpuRuntime;
}

/// Default runtime based on enabled features
///
/// - With `cuda` feature: `CudaRuntime`
/// - With `wgpu` feature (no cuda): `WgpuRuntime`
/// - Otherwise: `CpuRuntime`
#[cfg(feature = "cuda")]
pub type DefaultRuntime = runtime::cuda::CudaRuntime;

/// Default runtime based on enabled features
#[cfg(all(feature = "wgpu", not(feature = "cuda")))]
pub type DefaultRuntime = runtime::wgpu::WgpuRuntime;

/// Default runtime based on enabled features
#[cfg(not(any(feature = "cuda", feature = "wgpu")))]
pub type DefaultRuntime = runtime::cpu::CpuRuntime;
