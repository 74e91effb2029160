//! Dispatch entry points for the copy kernels
//!
//! Every entry point follows the same queue-and-check pattern:
//!
//! 1. compute the launch geometry from `n` (never cached),
//! 2. enqueue the kernel on the client's stream,
//! 3. query the stream's last launch error.
//!
//! The call returns once the copy is enqueued. Completion is observed through
//! [`RuntimeClient::synchronize`](crate::runtime::RuntimeClient::synchronize).
//! An `Err(Error::LaunchFailed { .. })` means the device rejected the launch;
//! the same request would fail again, so callers should treat it as fatal.
//!
//! None of these functions validate their pointers. See [`crate::buffer`]
//! for the checked API.

use crate::dtype::{DType, Element, WIDE_WORD_BYTES};
use crate::error::{Error, Result};
use crate::ops::CopyKernels;
use crate::ops::launch::{
    BLOCKING_FACTOR, BlockedVariant, CopyStrategy, LOOPED_GROUP_CAP, LaunchGeometry,
};
use crate::runtime::{Device, Runtime, RuntimeClient};

/// Geometry for a grid-stride kernel: enough groups to cover `n`, but no
/// more than the device accepts. Kernels loop over whatever is left.
fn grid_stride_geometry<R: Runtime>(
    client: &R::Client,
    n: usize,
    granularity: usize,
    cap: usize,
) -> LaunchGeometry {
    let max_groups = client.device().limits().max_groups;
    LaunchGeometry::for_count(n, granularity).capped(cap.min(max_groups))
}

/// Scalar grid-stride copy of `n` elements.
///
/// Works for any element type, alignment and count. The grid is clamped to
/// the device's group limit, so large counts never fail for lack of groups.
///
/// # Safety
/// - `src` and `dst` must be device pointers on `client`'s device addressing
///   at least `n` elements of `T`
/// - the two ranges must not overlap
/// - both must stay valid until the stream has executed the copy
pub unsafe fn scalar_copy<R: Runtime, T: Element>(
    client: &R::Client,
    n: usize,
    src: u64,
    dst: u64,
) -> Result<()> {
    let granularity = CopyStrategy::Scalar.granularity(T::DTYPE, 1);
    let geometry = grid_stride_geometry::<R>(client, n, granularity, usize::MAX);
    tracing::debug!(
        backend = R::name(),
        strategy = "scalar",
        dtype = %T::DTYPE,
        n,
        groups = geometry.groups,
        threads = geometry.threads_per_group,
        "enqueue copy"
    );
    unsafe { client.enqueue_scalar_copy::<T>(geometry, n, src, dst)? };
    client.check_last_error()
}

/// Vectorized copy of `n` elements: whole 16-byte words first, then the
/// `n % (16 / size_of::<T>())` trailing elements.
///
/// `size_of::<T>()` must divide 16; this is checked at compile time.
///
/// # Safety
/// Same as [`scalar_copy`], and both pointers must be 16-byte aligned.
pub unsafe fn vector_copy<R: Runtime, T: Element>(
    client: &R::Client,
    n: usize,
    src: u64,
    dst: u64,
) -> Result<()> {
    const {
        assert!(
            WIDE_WORD_BYTES % std::mem::size_of::<T>() == 0,
            "element size must divide the wide word"
        )
    };

    let granularity = CopyStrategy::Vector.granularity(T::DTYPE, 1);
    let geometry = grid_stride_geometry::<R>(client, n, granularity, usize::MAX);
    tracing::debug!(
        backend = R::name(),
        strategy = "vector",
        dtype = %T::DTYPE,
        n,
        groups = geometry.groups,
        threads = geometry.threads_per_group,
        "enqueue copy"
    );
    unsafe { client.enqueue_vector_copy::<T>(geometry, n, src, dst)? };
    client.check_last_error()
}

/// Register-blocked copy of `n` f32 values with blocking factor `K`.
///
/// Works on `n / 4` float4 words; the `n % 4` trailing floats are copied by
/// thread 0. [`BlockedVariant::GridStride`] launches at most
/// [`LOOPED_GROUP_CAP`] groups (fewer if the device allows fewer) and loops.
/// The single pass is never clamped and fails on grids the device rejects.
///
/// # Safety
/// Same as [`vector_copy`] with `T = f32`.
pub unsafe fn blocked_copy<R: Runtime, const K: usize>(
    client: &R::Client,
    variant: BlockedVariant,
    n: usize,
    src: u64,
    dst: u64,
) -> Result<()> {
    const { assert!(K > 0, "blocking factor must be positive") };

    let granularity = CopyStrategy::RegisterBlocked.granularity(DType::F32, K);
    let geometry = match variant {
        BlockedVariant::SinglePass => LaunchGeometry::for_count(n, granularity),
        BlockedVariant::GridStride => {
            grid_stride_geometry::<R>(client, n, granularity, LOOPED_GROUP_CAP)
        }
    };
    tracing::debug!(
        backend = R::name(),
        strategy = variant.name(),
        k = K,
        n,
        groups = geometry.groups,
        threads = geometry.threads_per_group,
        "enqueue copy"
    );
    unsafe { client.enqueue_blocked_copy::<K>(variant, geometry, n, src, dst)? };
    client.check_last_error()
}

/// Copy `n` elements with an explicitly chosen strategy.
///
/// [`CopyStrategy::RegisterBlocked`] only exists for `f32` and uses
/// [`BLOCKING_FACTOR`]; any other element type yields
/// `Error::UnsupportedDType`.
///
/// # Safety
/// The preconditions of the chosen strategy's entry point.
pub unsafe fn copy_with<R: Runtime, T: Element>(
    client: &R::Client,
    strategy: CopyStrategy,
    n: usize,
    src: u64,
    dst: u64,
) -> Result<()> {
    unsafe {
        match strategy {
            CopyStrategy::Scalar => scalar_copy::<R, T>(client, n, src, dst),
            CopyStrategy::Vector => vector_copy::<R, T>(client, n, src, dst),
            CopyStrategy::RegisterBlocked if T::DTYPE == DType::F32 => {
                memcpy_float::<R>(client, n, src, dst)
            }
            CopyStrategy::RegisterBlocked => {
                Err(Error::unsupported_dtype(T::DTYPE, "register-blocked copy"))
            }
        }
    }
}

// ============================================================================
// Named instances
// ============================================================================

/// Scalar copy of `n` `i32` values. See [`scalar_copy`].
///
/// # Safety
/// See [`scalar_copy`].
pub unsafe fn scalar_copy_i32<R: Runtime>(
    client: &R::Client,
    n: usize,
    src: u64,
    dst: u64,
) -> Result<()> {
    unsafe { scalar_copy::<R, i32>(client, n, src, dst) }
}

/// Scalar copy of `n` `i64` values. See [`scalar_copy`].
///
/// # Safety
/// See [`scalar_copy`].
pub unsafe fn scalar_copy_i64<R: Runtime>(
    client: &R::Client,
    n: usize,
    src: u64,
    dst: u64,
) -> Result<()> {
    unsafe { scalar_copy::<R, i64>(client, n, src, dst) }
}

/// Vectorized copy of `n` `i32` values (4 per wide word). See [`vector_copy`].
///
/// # Safety
/// See [`vector_copy`].
pub unsafe fn vector_copy_i32<R: Runtime>(
    client: &R::Client,
    n: usize,
    src: u64,
    dst: u64,
) -> Result<()> {
    unsafe { vector_copy::<R, i32>(client, n, src, dst) }
}

/// Vectorized copy of `n` `i64` values (2 per wide word). See [`vector_copy`].
///
/// # Safety
/// See [`vector_copy`].
pub unsafe fn vector_copy_i64<R: Runtime>(
    client: &R::Client,
    n: usize,
    src: u64,
    dst: u64,
) -> Result<()> {
    unsafe { vector_copy::<R, i64>(client, n, src, dst) }
}

/// Register-blocked copy of `n` f32 values, single pass, `K = 2`.
///
/// # Safety
/// See [`blocked_copy`].
pub unsafe fn memcpy_float<R: Runtime>(
    client: &R::Client,
    n: usize,
    src: u64,
    dst: u64,
) -> Result<()> {
    unsafe { blocked_copy::<R, BLOCKING_FACTOR>(client, BlockedVariant::SinglePass, n, src, dst) }
}

/// Register-blocked copy of `n` f32 values, grid-stride with a capped grid,
/// `K = 2`.
///
/// # Safety
/// See [`blocked_copy`].
pub unsafe fn memcpy_float_looped<R: Runtime>(
    client: &R::Client,
    n: usize,
    src: u64,
    dst: u64,
) -> Result<()> {
    unsafe { blocked_copy::<R, BLOCKING_FACTOR>(client, BlockedVariant::GridStride, n, src, dst) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtype::WideWord;
    use crate::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};

    /// Host-side buffer usable as a CPU device buffer (wide-word aligned)
    fn aligned_f32(values: &[f32]) -> Vec<WideWord> {
        let mut words = vec![WideWord::default(); values.len().div_ceil(4) + 1];
        bytemuck::cast_slice_mut::<WideWord, f32>(&mut words)[..values.len()]
            .copy_from_slice(values);
        words
    }

    #[test]
    fn test_scalar_copy_i64() {
        let client = CpuClient::new(CpuDevice::new());
        let src: Vec<i64> = (0..777).collect();
        let mut dst = vec![0i64; 777];
        unsafe {
            scalar_copy_i64::<CpuRuntime>(
                &client,
                src.len(),
                src.as_ptr() as u64,
                dst.as_mut_ptr() as u64,
            )
            .unwrap();
        }
        client.synchronize().unwrap();
        assert_eq!(src, dst);
    }

    #[test]
    fn test_memcpy_float_copies_tail() {
        let client = CpuClient::new(CpuDevice::new());
        let values: Vec<f32> = (0..1027).map(|i| i as f32 * 0.5).collect();
        let src = aligned_f32(&values);
        let mut dst = vec![WideWord::default(); src.len()];
        unsafe {
            memcpy_float::<CpuRuntime>(
                &client,
                values.len(),
                src.as_ptr() as u64,
                dst.as_mut_ptr() as u64,
            )
            .unwrap();
        }
        client.synchronize().unwrap();
        let out: &[f32] = bytemuck::cast_slice(&dst);
        assert_eq!(&out[..values.len()], &values[..]);
        assert!(out[values.len()..].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_copy_with_rejects_blocked_integers() {
        let client = CpuClient::new(CpuDevice::new());
        let err = unsafe {
            copy_with::<CpuRuntime, i32>(&client, CopyStrategy::RegisterBlocked, 0, 0, 0)
        }
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedDType { dtype: DType::I32, .. }));
    }
}
