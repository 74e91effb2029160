//! CopyKernels implementation for the CPU runtime
//!
//! Each enqueue validates the geometry against the device limits, then
//! pushes one job onto the client's stream. The job runs the whole grid.

use super::grid::launch_grid;
use super::kernels;
use super::{CpuClient, CpuRuntime};
use crate::dtype::{DType, Element, WIDE_WORD_BYTES, WideWord};
use crate::error::Result;
use crate::ops::CopyKernels;
use crate::ops::launch::{BlockedVariant, FLOAT4_LENGTH, LaunchGeometry};
use crate::runtime::Device;

const BACKEND: &str = "cpu";

impl CpuClient {
    fn admit(&self, kernel: &str, geometry: &LaunchGeometry) -> bool {
        self.last_error
            .admit(BACKEND, kernel, &self.device.limits(), geometry)
    }
}

#[inline]
fn debug_assert_wide_aligned(src: u64, dst: u64) {
    debug_assert!(
        src % WIDE_WORD_BYTES as u64 == 0 && dst % WIDE_WORD_BYTES as u64 == 0,
        "wide-word kernels need {WIDE_WORD_BYTES}-byte aligned buffers (src=0x{src:x}, dst=0x{dst:x})"
    );
}

impl CopyKernels<CpuRuntime> for CpuClient {
    unsafe fn enqueue_scalar_copy<T: Element>(
        &self,
        geometry: LaunchGeometry,
        n: usize,
        src: u64,
        dst: u64,
    ) -> Result<()> {
        let kernel = format!("scalar_copy_{}", T::DTYPE.short_name());
        if !self.admit(&kernel, &geometry) {
            return Ok(());
        }

        self.stream.enqueue(move || {
            launch_grid(geometry, |ctx| unsafe {
                kernels::scalar_copy_thread(ctx, n, src as *const T, dst as *mut T)
            });
        });
        Ok(())
    }

    unsafe fn enqueue_vector_copy<T: Element>(
        &self,
        geometry: LaunchGeometry,
        n: usize,
        src: u64,
        dst: u64,
    ) -> Result<()> {
        debug_assert_wide_aligned(src, dst);
        let kernel = format!("vector_copy_{}", T::DTYPE.short_name());
        if !self.admit(&kernel, &geometry) {
            return Ok(());
        }

        self.stream.enqueue(move || {
            launch_grid(geometry, |ctx| unsafe {
                kernels::vector_copy_thread(ctx, n, src as *const T, dst as *mut T)
            });
        });
        Ok(())
    }

    unsafe fn enqueue_blocked_copy<const K: usize>(
        &self,
        variant: BlockedVariant,
        geometry: LaunchGeometry,
        n: usize,
        src: u64,
        dst: u64,
    ) -> Result<()> {
        debug_assert!(K > 0, "blocking factor must be positive");
        debug_assert_wide_aligned(src, dst);
        let kernel = format!("{}_copy_k{}_{}", variant.name(), K, DType::F32.short_name());
        if !self.admit(&kernel, &geometry) {
            return Ok(());
        }

        let words = n / FLOAT4_LENGTH;
        self.stream.enqueue(move || {
            launch_grid(geometry, |ctx| unsafe {
                let (src_w, dst_w) = (src as *const WideWord, dst as *mut WideWord);
                match variant {
                    BlockedVariant::SinglePass => {
                        kernels::blocked_copy_thread::<K>(ctx, words, src_w, dst_w)
                    }
                    BlockedVariant::GridStride => {
                        kernels::blocked_copy_loop_thread::<K>(ctx, words, src_w, dst_w)
                    }
                }
                kernels::float_tail_thread(ctx, n, src as *const f32, dst as *mut f32);
            });
        });
        Ok(())
    }

    fn check_last_error(&self) -> Result<()> {
        self.last_error.take()
    }
}
