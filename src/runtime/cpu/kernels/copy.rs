//! Copy kernels (scalar, vector, register-blocked)

use crate::dtype::{Element, WideWord};
use crate::ops::launch::FLOAT4_LENGTH;
use crate::runtime::cpu::grid::ThreadCtx;

/// Scalar grid-stride copy.
///
/// Thread `r` copies elements `r, r + T, r + 2T, ...` below `n`, where `T` is
/// the total thread count of the grid.
///
/// # Safety
/// - `src` and `dst` must be valid pointers to `n` elements
/// - `dst` must not overlap with `src`
#[inline]
pub unsafe fn scalar_copy_thread<T: Copy>(ctx: ThreadCtx, n: usize, src: *const T, dst: *mut T) {
    let stride = ctx.total_threads();
    let mut i = ctx.global_rank();
    while i < n {
        *dst.add(i) = *src.add(i);
        i += stride;
    }
}

/// Vectorized grid-stride copy.
///
/// Phase 1 moves whole wide words `[0, n / L)` where `L = T::VECTOR_LENGTH`.
/// Phase 2 moves the `n % L` trailing elements one at a time, starting at
/// `(n / L) * L + rank` and advancing by the total thread count.
///
/// # Safety
/// - `src` and `dst` must be valid pointers to `n` elements
/// - both pointers must be aligned to a wide word
/// - `dst` must not overlap with `src`
#[inline]
pub unsafe fn vector_copy_thread<T: Element>(
    ctx: ThreadCtx,
    n: usize,
    src: *const T,
    dst: *mut T,
) {
    let rank = ctx.global_rank();
    let stride = ctx.total_threads();
    let words = n / T::VECTOR_LENGTH;

    let src_words = src as *const WideWord;
    let dst_words = dst as *mut WideWord;
    let mut i = rank;
    while i < words {
        *dst_words.add(i) = *src_words.add(i);
        i += stride;
    }

    let mut i = words * T::VECTOR_LENGTH + rank;
    while i < n {
        *dst.add(i) = *src.add(i);
        i += stride;
    }
}

/// Stage up to `K` wide words, then write them out.
///
/// Slot `s` covers word `base + s * lane_stride`. Every load completes before
/// the first store; each slot is bounds-checked against `words` on both
/// passes.
#[inline(always)]
unsafe fn stage_and_store<const K: usize>(
    base: usize,
    lane_stride: usize,
    words: usize,
    src: *const WideWord,
    dst: *mut WideWord,
) {
    let mut staged = [WideWord::default(); K];

    for (slot, word) in staged.iter_mut().enumerate() {
        let idx = base + slot * lane_stride;
        if idx < words {
            *word = *src.add(idx);
        }
    }

    for (slot, word) in staged.iter().enumerate() {
        let idx = base + slot * lane_stride;
        if idx < words {
            *dst.add(idx) = *word;
        }
    }
}

/// Register-blocked copy, single pass.
///
/// The thread covers words `thread_idx + K * group_idx * threads_per_group
/// + s * threads_per_group` for slots `s in 0..K`. The grid must satisfy
/// `groups * threads_per_group * K >= words`.
///
/// # Safety
/// - `src` and `dst` must be valid pointers to `words` wide words
/// - `dst` must not overlap with `src`
#[inline]
pub unsafe fn blocked_copy_thread<const K: usize>(
    ctx: ThreadCtx,
    words: usize,
    src: *const WideWord,
    dst: *mut WideWord,
) {
    let tpg = ctx.threads_per_group as usize;
    let base = ctx.thread_idx as usize + K * ctx.group_idx * tpg;
    stage_and_store::<K>(base, tpg, words, src, dst);
}

/// Register-blocked copy, grid-stride.
///
/// Same per-step body as [`blocked_copy_thread`], repeated with a step of
/// `K * total_threads` until the base passes `words`. Coverage does not
/// depend on the group count.
///
/// # Safety
/// - `src` and `dst` must be valid pointers to `words` wide words
/// - `dst` must not overlap with `src`
#[inline]
pub unsafe fn blocked_copy_loop_thread<const K: usize>(
    ctx: ThreadCtx,
    words: usize,
    src: *const WideWord,
    dst: *mut WideWord,
) {
    let tpg = ctx.threads_per_group as usize;
    let step = K * ctx.total_threads();
    let mut base = ctx.thread_idx as usize + K * ctx.group_idx * tpg;
    while base < words {
        stage_and_store::<K>(base, tpg, words, src, dst);
        base += step;
    }
}

/// Copy the `n % 4` floats past the last full float4 word.
///
/// Only global rank 0 does any work.
///
/// # Safety
/// - `src` and `dst` must be valid pointers to `n` floats
/// - `dst` must not overlap with `src`
#[inline]
pub unsafe fn float_tail_thread(ctx: ThreadCtx, n: usize, src: *const f32, dst: *mut f32) {
    if ctx.global_rank() != 0 {
        return;
    }
    let start = (n / FLOAT4_LENGTH) * FLOAT4_LENGTH;
    for i in start..n {
        *dst.add(i) = *src.add(i);
    }
}
