//! WebGPU runtime implementation (requires `wgpu` feature)
//!
//! Cross-platform GPU backend built on wgpu. Copy kernels are WGSL compute
//! shaders compiled on first use and cached per client.
//!
//! # Buffer handles
//!
//! WebGPU has no raw device pointers. Allocations are registered storage
//! buffers and the `u64` a `DeviceBuffer` carries is the registry handle.
//! Copies always start at the beginning of both buffers, and every buffer is
//! padded to a whole wide word.

mod cache;
mod client;
mod device;
mod ops;
mod runtime;
pub mod shaders;

pub use client::{WgpuAllocator, WgpuClient};
pub use device::WgpuDevice;
pub use runtime::{WgpuRuntime, is_wgpu_available, wgpu_device, wgpu_device_id};
