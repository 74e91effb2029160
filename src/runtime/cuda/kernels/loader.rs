//! CUDA kernel loading and caching infrastructure
//!
//! This module loads the PTX compiled by build.rs, caches the modules
//! per-device, and converts launch geometry into cudarc launch configs.
//!
//! # Architecture
//!
//! - PTX files are compiled by `build.rs` using nvcc
//! - Modules are loaded on first use and cached per-device
//!
//! # Thread Safety
//!
//! The module cache uses `OnceLock<Mutex<HashMap>>` for thread-safe
//! initialization and concurrent access from multiple CUDA streams.

pub use cudarc::driver::safe::LaunchConfig;
use cudarc::driver::safe::{CudaContext, CudaFunction, CudaModule};
use cudarc::nvrtc::Ptx;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::error::{Error, Result};
use crate::ops::launch::LaunchGeometry;

// ============================================================================
// PTX Sources (compiled by build.rs)
// ============================================================================

/// Directory containing compiled PTX files (set by build.rs)
const KERNEL_DIR: &str = env!("CUDA_KERNEL_DIR");

/// Load PTX from compiled file.
fn load_ptx(name: &str) -> Ptx {
    let path = format!("{}/{}.ptx", KERNEL_DIR, name);
    Ptx::from_file(path)
}

// ============================================================================
// Kernel Module Cache
// ============================================================================

/// Cache for loaded CUDA modules, keyed by (device_index, module_name)
static MODULE_CACHE: OnceLock<Mutex<HashMap<(usize, &'static str), Arc<CudaModule>>>> =
    OnceLock::new();

/// Get or load a CUDA module from PTX.
///
/// Modules are cached per-device to avoid repeated loading. This is thread-safe
/// and can be called concurrently from multiple streams.
///
/// # Errors
///
/// Returns an error if the PTX file cannot be loaded or the module cannot be created.
pub fn get_or_load_module(
    context: &Arc<CudaContext>,
    device_index: usize,
    module_name: &'static str,
) -> Result<Arc<CudaModule>> {
    let cache = MODULE_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = cache.lock();

    let key = (device_index, module_name);
    if let Some(module) = guard.get(&key) {
        return Ok(module.clone());
    }

    let module = context.load_module(load_ptx(module_name)).map_err(|e| {
        Error::Internal(format!(
            "Failed to load CUDA module '{}': {:?}. \
             Ensure CUDA kernels were compiled correctly by build.rs.",
            module_name, e
        ))
    })?;
    tracing::debug!(device = device_index, module = module_name, "loaded CUDA module");

    guard.insert(key, module.clone());
    Ok(module)
}

/// Get a kernel function from a loaded module.
///
/// # Errors
///
/// Returns an error if the kernel function is not found in the module.
pub fn get_kernel_function(module: &Arc<CudaModule>, kernel_name: &str) -> Result<CudaFunction> {
    module.load_function(kernel_name).map_err(|e| {
        Error::Internal(format!(
            "Failed to get kernel '{}': {:?}. \
             Check that the kernel name matches the CUDA source.",
            kernel_name, e
        ))
    })
}

// ============================================================================
// Launch Configuration
// ============================================================================

/// Convert a 1D launch geometry into a cudarc launch config.
///
/// The geometry must already have been checked against the device limits,
/// which keep the group count within `u32`.
#[inline]
pub fn launch_config(geometry: &LaunchGeometry) -> LaunchConfig {
    LaunchConfig {
        grid_dim: (geometry.groups as u32, 1, 1),
        block_dim: (geometry.threads_per_group, 1, 1),
        shared_mem_bytes: geometry.shared_mem_bytes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_config_is_one_dimensional() {
        let cfg = launch_config(&LaunchGeometry::for_count(64 * 10 + 1, 1));
        assert_eq!(cfg.grid_dim, (11, 1, 1));
        assert_eq!(cfg.block_dim, (64, 1, 1));
        assert_eq!(cfg.shared_mem_bytes, 0);
    }
}
