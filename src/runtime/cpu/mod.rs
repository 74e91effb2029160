//! CPU runtime implementation
//!
//! The CPU runtime is an emulated device: buffers live in host memory, but
//! copies run through the same grid/group/thread programs the GPU backends
//! execute, on an asynchronous FIFO stream.
//!
//! # Execution Model
//!
//! - Each `CpuClient` owns a stream: a worker thread draining a FIFO queue.
//!   Enqueue returns immediately; `synchronize` waits for the queue to drain.
//! - A launch runs every group of the grid. Groups execute in parallel on the
//!   rayon pool (feature `rayon`), the threads of one group sequentially.
//! - Each destination element is written by exactly one logical thread, so
//!   kernels need no synchronization.

mod cache;
mod client;
mod device;
pub(crate) mod grid;
pub(crate) mod kernels;
mod ops;
mod runtime;
mod stream;

pub use client::{CpuAllocator, CpuClient};
pub use device::CpuDevice;
pub use grid::ThreadCtx;
pub use runtime::CpuRuntime;
