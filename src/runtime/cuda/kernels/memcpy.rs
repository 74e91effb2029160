//! Copy kernel launchers
//!
//! Thin wrappers over the extern "C" kernels in `memcpy.cu`. Kernel names
//! follow `{strategy}_copy_{dtype}`; the register-blocked kernels are
//! instantiated for a fixed set of blocking factors.

use cudarc::driver::PushKernelArg;
use cudarc::driver::safe::{CudaContext, CudaStream};
use std::sync::Arc;

use super::loader::{get_kernel_function, get_or_load_module, launch_config};
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::ops::launch::{BlockedVariant, LaunchGeometry};

/// Module name for the copy kernels
pub const MEMCPY_MODULE: &str = "memcpy";

/// Blocking factors compiled into `memcpy.cu`
pub const BLOCKED_FACTORS: [usize; 4] = [1, 2, 4, 8];

/// Name of the scalar or vector kernel for `dtype`
pub fn copy_kernel_name(strategy: &str, dtype: DType) -> String {
    format!("{}_copy_{}", strategy, dtype.short_name())
}

/// Name of the register-blocked kernel with blocking factor `k`
pub fn blocked_kernel_name(variant: BlockedVariant, k: usize) -> String {
    format!("{}_copy_k{}_f32", variant.name(), k)
}

/// Outcome of a launch attempt
///
/// `Ok(Err(reason))` is a launch the driver rejected; `Err(_)` means the
/// kernel could not be prepared at all.
pub type LaunchOutcome = Result<std::result::Result<(), String>>;

/// Launch one of the copy kernels with arguments `(n, src, dst)`.
///
/// # Safety
///
/// `src` and `dst` must be valid device memory for the kernel's element type
/// and count, and must meet the kernel's alignment requirement.
pub unsafe fn launch_copy_kernel(
    context: &Arc<CudaContext>,
    stream: &CudaStream,
    device_index: usize,
    kernel_name: &str,
    geometry: &LaunchGeometry,
    n: usize,
    src: u64,
    dst: u64,
) -> LaunchOutcome {
    let module = get_or_load_module(context, device_index, MEMCPY_MODULE)?;
    let func = get_kernel_function(&module, kernel_name)?;

    let n = n as u64;
    let mut builder = stream.launch_builder(&func);
    builder.arg(&n);
    builder.arg(&src);
    builder.arg(&dst);

    // SAFETY: argument list matches `(unsigned long long, const T*, T*)`;
    // pointer validity is the caller's contract.
    let launched = unsafe { builder.launch(launch_config(geometry)) };
    Ok(launched.map(|_| ()).map_err(|e| format!("{:?}", e)))
}

/// Check that `k` is one of the compiled blocking factors.
pub fn check_blocking_factor(k: usize) -> Result<()> {
    if BLOCKED_FACTORS.contains(&k) {
        Ok(())
    } else {
        Err(Error::backend_limitation(
            "cuda",
            "register-blocked copy",
            format!("blocking factor {} not compiled (available: {:?})", k, BLOCKED_FACTORS),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_names() {
        assert_eq!(copy_kernel_name("scalar", DType::I32), "scalar_copy_i32");
        assert_eq!(copy_kernel_name("vector", DType::I64), "vector_copy_i64");
        assert_eq!(
            blocked_kernel_name(BlockedVariant::SinglePass, 2),
            "blocked_copy_k2_f32"
        );
        assert_eq!(
            blocked_kernel_name(BlockedVariant::GridStride, 4),
            "blocked_loop_copy_k4_f32"
        );
    }

    #[test]
    fn test_blocking_factor_check() {
        assert!(check_blocking_factor(2).is_ok());
        assert!(matches!(
            check_blocking_factor(3),
            Err(Error::BackendLimitation { .. })
        ));
    }
}
