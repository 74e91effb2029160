//! Launch configuration for the copy kernels
//!
//! Maps a problem size to a 1D grid of execution groups. Every strategy uses
//! the same fixed group width ([`THREADS_PER_GROUP`]); strategies differ only
//! in how many elements one thread-step covers (the granularity `G`).
//!
//! ```text
//! scalar            G = 1
//! vector            G = 16 / size_of::<T>()
//! register-blocked  G = 4 * K              (K float4 words per thread-step)
//! ```

use crate::dtype::{DType, WIDE_WORD_BYTES};

/// Threads per execution group for every copy kernel (tuning constant)
pub const THREADS_PER_GROUP: u32 = 64;

/// Default blocking factor of the register-blocked kernel
pub const BLOCKING_FACTOR: usize = 2;

/// Group count used by the grid-stride register-blocked variant
pub const LOOPED_GROUP_CAP: usize = 64;

/// f32 lanes in one float4 wide word
pub const FLOAT4_LENGTH: usize = WIDE_WORD_BYTES / std::mem::size_of::<f32>();

/// Grid shape for one kernel launch.
///
/// Derived from the element count on every call and never cached.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LaunchGeometry {
    /// Number of execution groups (1D grid)
    pub groups: usize,
    /// Threads per group
    pub threads_per_group: u32,
    /// Dynamic shared memory per group (always 0 for copies)
    pub shared_mem_bytes: u32,
}

impl LaunchGeometry {
    /// Geometry covering `n` elements at `granularity` elements per thread-step.
    #[inline]
    pub fn for_count(n: usize, granularity: usize) -> Self {
        Self {
            groups: group_count(n, granularity, THREADS_PER_GROUP),
            threads_per_group: THREADS_PER_GROUP,
            shared_mem_bytes: 0,
        }
    }

    /// Geometry with an explicit group count.
    #[inline]
    pub fn with_groups(groups: usize) -> Self {
        Self {
            groups: groups.max(1),
            threads_per_group: THREADS_PER_GROUP,
            shared_mem_bytes: 0,
        }
    }

    /// Clamp the group count to `max_groups`.
    ///
    /// Only valid for grid-stride kernels, whose coverage does not depend on
    /// the group count.
    #[inline]
    pub fn capped(self, max_groups: usize) -> Self {
        Self {
            groups: self.groups.min(max_groups.max(1)),
            ..self
        }
    }

    /// Total logical threads in the grid
    #[inline]
    pub fn total_threads(&self) -> usize {
        self.groups * self.threads_per_group as usize
    }
}

/// Minimal group count such that `groups * threads_per_group * granularity >= n`.
///
/// Ceiling division, never less than one group: `n == 0` still launches a
/// single group whose threads perform zero iterations.
#[inline]
pub fn group_count(n: usize, granularity: usize, threads_per_group: u32) -> usize {
    debug_assert!(granularity > 0, "granularity must be positive");
    let per_group = threads_per_group as usize * granularity;
    n.div_ceil(per_group).max(1)
}

/// Copy strategy selector
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CopyStrategy {
    /// One element per thread-step, any alignment
    Scalar,
    /// One wide word per thread-step plus a scalar remainder
    Vector,
    /// `K` wide words staged per thread-step (f32 only)
    RegisterBlocked,
}

impl CopyStrategy {
    /// Elements covered by one thread-step for `dtype` with blocking factor `k`
    #[inline]
    pub const fn granularity(self, dtype: DType, k: usize) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vector => dtype.vector_length(),
            Self::RegisterBlocked => FLOAT4_LENGTH * k,
        }
    }

    /// Pick a strategy from the element type and count.
    ///
    /// `wide_aligned` reports whether both buffers sit on a wide-word
    /// boundary. Copies shorter than one wide word gain nothing from the
    /// vector paths.
    pub fn auto(dtype: DType, n: usize, wide_aligned: bool) -> Self {
        if !wide_aligned || n < dtype.vector_length() {
            return Self::Scalar;
        }
        if dtype == DType::F32 {
            Self::RegisterBlocked
        } else {
            Self::Vector
        }
    }

    /// Name used in logs
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scalar => "scalar",
            Self::Vector => "vector",
            Self::RegisterBlocked => "blocked",
        }
    }
}

/// Indexing scheme of the register-blocked kernel
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlockedVariant {
    /// Each thread covers its K slots once; the grid is sized to cover the
    /// whole buffer.
    SinglePass,
    /// Threads loop over the buffer in steps of `K * total_threads`; the grid
    /// may be smaller than the buffer.
    GridStride,
}

impl BlockedVariant {
    /// Kernel name component
    pub const fn name(self) -> &'static str {
        match self {
            Self::SinglePass => "blocked",
            Self::GridStride => "blocked_loop",
        }
    }
}
