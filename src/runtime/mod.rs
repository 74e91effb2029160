//! Runtime backends for the copy kernels
//!
//! This module defines the `Runtime` trait and provides implementations
//! for the supported compute backends (emulated CPU device, CUDA, WebGPU).
//!
//! # Architecture
//!
//! ```text
//! Runtime (backend identity)
//! ├── Device (identifies a specific GPU/CPU, reports launch limits)
//! ├── Client (owns the stream, enqueues copy kernels, synchronizes)
//! └── Allocator (device memory management)
//! ```

mod allocator;
pub(crate) mod error_flag;
mod traits;

pub mod cpu;

#[cfg(feature = "cuda")]
pub mod cuda;

#[cfg(feature = "wgpu")]
pub mod wgpu;

pub use allocator::{Allocator, DefaultAllocator};
pub use traits::{Device, DeviceLimits, Runtime, RuntimeClient};
