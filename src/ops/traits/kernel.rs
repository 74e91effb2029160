//! Low-level copy kernel trait implemented by every backend client.

use crate::dtype::Element;
use crate::error::Result;
use crate::ops::launch::{BlockedVariant, LaunchGeometry};
use crate::runtime::{Runtime, RuntimeClient};

/// Execution backend for the copy kernels
///
/// Each backend's client (which owns the stream) implements this trait once.
/// The dispatch entry points in [`crate::ops::memcpy`] are generic over it,
/// so backend selection happens at compile time and costs nothing at run
/// time.
///
/// # Enqueue semantics
///
/// `enqueue_*` methods submit work to the client's stream and return without
/// waiting for it. A launch the device rejects does not make `enqueue_*`
/// fail: the rejection is recorded in the client's sticky error flag and
/// reported by the next [`check_last_error`](Self::check_last_error), the
/// same split the driver APIs make between launching and querying.
/// `enqueue_*` only returns `Err` when the kernel could not even be prepared
/// (e.g. a kernel module failed to load).
///
/// # Safety Contract
///
/// All enqueue methods are unsafe because they operate on raw device
/// pointers. Callers must ensure:
/// - `src` and `dst` address at least `n` elements on this client's device
/// - `src` and `dst` do not overlap
/// - for the vector and register-blocked kernels, both pointers are aligned
///   to a 16-byte wide word
/// - the memory stays valid until the stream has executed the copy
pub trait CopyKernels<R: Runtime>: RuntimeClient<R> {
    /// Enqueue the scalar grid-stride copy of `n` elements.
    ///
    /// # Safety
    /// See the trait-level safety contract.
    unsafe fn enqueue_scalar_copy<T: Element>(
        &self,
        geometry: LaunchGeometry,
        n: usize,
        src: u64,
        dst: u64,
    ) -> Result<()>;

    /// Enqueue the vectorized copy of `n` elements (wide words, then a
    /// scalar remainder).
    ///
    /// # Safety
    /// See the trait-level safety contract.
    unsafe fn enqueue_vector_copy<T: Element>(
        &self,
        geometry: LaunchGeometry,
        n: usize,
        src: u64,
        dst: u64,
    ) -> Result<()>;

    /// Enqueue the register-blocked copy of `n` f32 values, staging `K`
    /// float4 words per thread-step.
    ///
    /// # Safety
    /// See the trait-level safety contract.
    unsafe fn enqueue_blocked_copy<const K: usize>(
        &self,
        variant: BlockedVariant,
        geometry: LaunchGeometry,
        n: usize,
        src: u64,
        dst: u64,
    ) -> Result<()>;

    /// Return and clear the most recent launch error on this stream.
    fn check_last_error(&self) -> Result<()>;
}
