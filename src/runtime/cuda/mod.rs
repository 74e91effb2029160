//! CUDA runtime implementation
//!
//! This module runs the copy kernels on NVIDIA GPUs using cudarc.
//!
//! # Features
//!
//! - `CudaDevice` - Represents a CUDA GPU device and reports its launch limits
//! - `CudaClient` - Owns a context and stream, launches the copy kernels
//! - `CudaRuntime` - Implements the generic Runtime trait
//!
//! Kernels are written in CUDA C++ (`kernels/memcpy.cu`), compiled to PTX by
//! `build.rs`, and loaded on first use.
//!
//! # Errors
//!
//! Allocation and transfer failures are returned as `Err`. A launch the
//! driver rejects is recorded on the client and reported by
//! `CopyKernels::check_last_error`, which also picks up faults raised by
//! kernels already running on the stream.

mod cache;
mod client;
mod device;
mod kernels;
mod ops;
mod runtime;

pub use client::{CudaAllocator, CudaClient};
pub use device::CudaDevice;
pub use runtime::{CudaRuntime, cuda_device, cuda_device_id, is_cuda_available};
