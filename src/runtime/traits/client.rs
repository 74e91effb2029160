//! Trait for runtime clients that own a stream

use super::Runtime;
use crate::error::Result;

/// Trait for runtime clients that handle operation dispatch
///
/// A client is the stream abstraction of a backend: work enqueued through
/// one client executes in submission order, work on different clients may
/// overlap.
pub trait RuntimeClient<R: Runtime>: Clone + Send + Sync {
    /// Get the device this client operates on
    fn device(&self) -> &R::Device;

    /// Synchronize: wait for all pending operations to complete
    ///
    /// Returns an error if work on the stream faulted while executing.
    fn synchronize(&self) -> Result<()>;

    /// Get the allocator for this client
    fn allocator(&self) -> &R::Allocator;
}
