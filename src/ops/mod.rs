//! Copy operations
//!
//! This module defines the launch configuration, the backend kernel trait
//! and the dispatch entry points.
//!
//! # Design
//!
//! Copy kernels are defined as a trait that is implemented by each backend's
//! `RuntimeClient`. The entry points in [`memcpy`] are generic over that
//! trait, so strategy and backend are both fixed at compile time.
//!
//! ```text
//! RuntimeClient<R>
//!   └── implements CopyKernels<R>
//!         ├── enqueue_scalar_copy   (one element per thread-step)
//!         ├── enqueue_vector_copy   (one wide word per thread-step + remainder)
//!         ├── enqueue_blocked_copy  (K staged wide words per thread-step)
//!         └── check_last_error      (sticky launch error query)
//! ```
//!
//! # Strategies
//!
//! | strategy         | element types | alignment | granularity      |
//! |------------------|---------------|-----------|------------------|
//! | scalar           | any           | none      | 1                |
//! | vector           | any           | 16 bytes  | `16 / size_of<T>`|
//! | register-blocked | f32           | 16 bytes  | `4 * K`          |

#[macro_use]
mod dispatch;
pub mod launch;
pub mod memcpy;
mod traits;

pub use launch::{
    BLOCKING_FACTOR, BlockedVariant, CopyStrategy, LOOPED_GROUP_CAP, LaunchGeometry,
    THREADS_PER_GROUP, group_count,
};
pub use traits::CopyKernels;
