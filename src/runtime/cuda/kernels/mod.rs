//! CUDA copy kernels
//!
//! Kernels are written in CUDA C++ (`memcpy.cu`) and compiled to PTX by
//! build.rs. The PTX is loaded at runtime and cached per-device.
//!
//! # Module Organization
//!
//! - `loader` - PTX loading, module cache, launch config conversion
//! - `memcpy` - Launchers and kernel naming for the copy kernels

mod loader;
mod memcpy;

pub use memcpy::{
    blocked_kernel_name, check_blocking_factor, copy_kernel_name, launch_copy_kernel,
};
