//! Operation traits implemented by the backend clients.

mod kernel;

pub use kernel::CopyKernels;
