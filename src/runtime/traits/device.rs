//! Trait for device identification

use crate::error::{Error, Result};
use crate::ops::launch::LaunchGeometry;

/// Launch limits of a device
///
/// Used by the backends to validate a launch before it is enqueued; a
/// geometry outside these limits is reported as a launch failure.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DeviceLimits {
    /// Maximum threads in one execution group
    pub max_threads_per_group: u32,
    /// Maximum groups in the (1D) grid
    pub max_groups: usize,
}

impl DeviceLimits {
    /// Check that `geometry` fits within these limits.
    pub fn check(&self, geometry: &LaunchGeometry) -> Result<()> {
        let threads_ok = geometry.threads_per_group > 0
            && geometry.threads_per_group <= self.max_threads_per_group;
        let groups_ok = geometry.groups > 0 && geometry.groups <= self.max_groups;
        if threads_ok && groups_ok {
            return Ok(());
        }
        Err(Error::InvalidGeometry {
            groups: geometry.groups,
            threads_per_group: geometry.threads_per_group,
            max_groups: self.max_groups,
            max_threads_per_group: self.max_threads_per_group,
        })
    }
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self {
            max_threads_per_group: 1024,
            max_groups: (1 << 31) - 1,
        }
    }
}

/// Trait for device identification
pub trait Device: Clone + Send + Sync + 'static {
    /// Unique identifier for this device
    fn id(&self) -> usize;

    /// Check if two devices are the same
    fn is_same(&self, other: &Self) -> bool {
        self.id() == other.id()
    }

    /// Human-readable name
    fn name(&self) -> String {
        format!("Device({})", self.id())
    }

    /// Launch limits of this device
    fn limits(&self) -> DeviceLimits {
        DeviceLimits::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_accept_copy_geometry() {
        let limits = DeviceLimits::default();
        assert!(limits.check(&LaunchGeometry::for_count(1_000_003, 1)).is_ok());
    }

    #[test]
    fn test_limits_reject_too_many_groups() {
        let limits = DeviceLimits {
            max_threads_per_group: 1024,
            max_groups: 4,
        };
        let err = limits
            .check(&LaunchGeometry::for_count(64 * 5, 1))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidGeometry { groups: 5, .. }));
    }

    #[test]
    fn test_limits_reject_wide_groups() {
        let limits = DeviceLimits {
            max_threads_per_group: 32,
            max_groups: 1024,
        };
        assert!(limits.check(&LaunchGeometry::for_count(1, 1)).is_err());
    }
}
