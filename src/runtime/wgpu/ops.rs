//! CopyKernels implementation for the WebGPU runtime
//!
//! `src` and `dst` are buffer handles from the registry. Element and word
//! indices are 32-bit in WGSL, so copies beyond `u32::MAX` units are a
//! backend limitation.

use super::client::require_buffer;
use super::shaders::{CopyDispatch, CopyParams, CopyShader, launch_copy};
use super::{WgpuClient, WgpuRuntime};
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::ops::CopyKernels;
use crate::ops::launch::{BlockedVariant, LaunchGeometry};

const BACKEND: &str = "wgpu";

/// u32 units per element of `T`
fn elem_units<T: Element>() -> u32 {
    T::DTYPE.units_per_element() as u32
}

/// Check that `n` elements of `units` u32 units are addressable in WGSL.
fn check_addressable(n: usize, units: u32, operation: &'static str) -> Result<u32> {
    match n.checked_mul(units as usize) {
        Some(total) if total <= u32::MAX as usize => Ok(n as u32),
        _ => Err(Error::backend_limitation(
            BACKEND,
            operation,
            format!("{} elements exceed 32-bit shader indexing", n),
        )),
    }
}

impl WgpuClient {
    fn submit_copy(
        &self,
        kernel: &str,
        geometry: &LaunchGeometry,
        src: u64,
        dst: u64,
        dispatches: &[CopyDispatch],
    ) -> Result<()> {
        if !self.last_error.admit(BACKEND, kernel, &self.limits, geometry) {
            return Ok(());
        }
        let src = require_buffer(src, "src")?;
        let dst = require_buffer(dst, "dst")?;
        launch_copy(
            &self.pipeline_cache,
            &self.queue,
            kernel,
            &src,
            &dst,
            dispatches,
        );
        Ok(())
    }
}

impl CopyKernels<WgpuRuntime> for WgpuClient {
    unsafe fn enqueue_scalar_copy<T: Element>(
        &self,
        geometry: LaunchGeometry,
        n: usize,
        src: u64,
        dst: u64,
    ) -> Result<()> {
        let units = elem_units::<T>();
        let n = check_addressable(n, units, "scalar copy")?;
        let kernel = format!("scalar_copy_{}", T::DTYPE.short_name());

        let dispatch = CopyDispatch {
            shader: CopyShader::Scalar,
            entry_point: "scalar_copy",
            groups: geometry.groups as u32,
            params: CopyParams {
                n,
                elem_units: units,
                start: 0,
                _pad: 0,
            },
        };
        self.submit_copy(&kernel, &geometry, src, dst, &[dispatch])
    }

    unsafe fn enqueue_vector_copy<T: Element>(
        &self,
        geometry: LaunchGeometry,
        n: usize,
        src: u64,
        dst: u64,
    ) -> Result<()> {
        let units = elem_units::<T>();
        let n32 = check_addressable(n, units, "vector copy")?;
        let kernel = format!("vector_copy_{}", T::DTYPE.short_name());

        let lanes = T::DTYPE.vector_length();
        let words = n / lanes;
        let groups = geometry.groups as u32;

        let mut dispatches = vec![CopyDispatch {
            shader: CopyShader::Vector,
            entry_point: "vector_copy",
            groups,
            params: CopyParams {
                n: words as u32,
                elem_units: units,
                start: 0,
                _pad: 0,
            },
        }];
        if words * lanes < n {
            dispatches.push(CopyDispatch {
                shader: CopyShader::Scalar,
                entry_point: "scalar_copy",
                groups,
                params: CopyParams {
                    n: n32,
                    elem_units: units,
                    start: (words * lanes) as u32,
                    _pad: 0,
                },
            });
        }
        self.submit_copy(&kernel, &geometry, src, dst, &dispatches)
    }

    unsafe fn enqueue_blocked_copy<const K: usize>(
        &self,
        variant: BlockedVariant,
        geometry: LaunchGeometry,
        n: usize,
        src: u64,
        dst: u64,
    ) -> Result<()> {
        if K == 0 {
            return Err(Error::backend_limitation(
                BACKEND,
                "register-blocked copy",
                "blocking factor must be positive",
            ));
        }
        let n = check_addressable(n, 1, "register-blocked copy")?;
        let kernel = format!(
            "{}_copy_k{}_{}",
            variant.name(),
            K,
            DType::F32.short_name()
        );
        let entry_point = match variant {
            BlockedVariant::SinglePass => "blocked_copy",
            BlockedVariant::GridStride => "blocked_loop_copy",
        };
        let dispatch = CopyDispatch {
            shader: CopyShader::Blocked(K),
            entry_point,
            groups: geometry.groups as u32,
            params: CopyParams {
                n,
                elem_units: 1,
                start: 0,
                _pad: 0,
            },
        };
        self.submit_copy(&kernel, &geometry, src, dst, &[dispatch])
    }

    fn check_last_error(&self) -> Result<()> {
        self.last_error.take()
    }
}
