//! Grid emulation: runs a per-thread kernel body over a launch geometry

use crate::ops::launch::LaunchGeometry;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Coordinates of one logical device thread.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ThreadCtx {
    /// Thread index within its group
    pub thread_idx: u32,
    /// Group index within the grid
    pub group_idx: usize,
    /// Threads per group
    pub threads_per_group: u32,
    /// Groups in the grid
    pub groups: usize,
}

impl ThreadCtx {
    /// Flat global rank: `group_idx * threads_per_group + thread_idx`
    #[inline(always)]
    pub fn global_rank(&self) -> usize {
        self.group_idx * self.threads_per_group as usize + self.thread_idx as usize
    }

    /// Total threads in the grid (the grid-stride step)
    #[inline(always)]
    pub fn total_threads(&self) -> usize {
        self.groups * self.threads_per_group as usize
    }
}

/// Execute `body` once for every thread of `geometry`.
///
/// Groups are independent and may run concurrently; threads within a group
/// run in index order on one OS thread.
pub(crate) fn launch_grid<F>(geometry: LaunchGeometry, body: F)
where
    F: Fn(ThreadCtx) + Sync,
{
    let run_group = |group_idx: usize| {
        for thread_idx in 0..geometry.threads_per_group {
            body(ThreadCtx {
                thread_idx,
                group_idx,
                threads_per_group: geometry.threads_per_group,
                groups: geometry.groups,
            });
        }
    };

    #[cfg(feature = "rayon")]
    (0..geometry.groups).into_par_iter().for_each(run_group);

    #[cfg(not(feature = "rayon"))]
    (0..geometry.groups).for_each(run_group);
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_every_thread_runs_once() {
        let geometry = LaunchGeometry::with_groups(5);
        let seen = Mutex::new(vec![0u32; geometry.total_threads()]);
        launch_grid(geometry, |ctx| {
            assert_eq!(ctx.total_threads(), 5 * 64);
            seen.lock()[ctx.global_rank()] += 1;
        });
        assert!(seen.into_inner().iter().all(|&count| count == 1));
    }

    #[test]
    fn test_global_rank() {
        let ctx = ThreadCtx {
            thread_idx: 3,
            group_idx: 2,
            threads_per_group: 64,
            groups: 4,
        };
        assert_eq!(ctx.global_rank(), 131);
        assert_eq!(ctx.total_threads(), 256);
    }
}
