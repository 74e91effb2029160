//! CPU device implementation

use crate::runtime::{Device, DeviceLimits};

/// CPU device (there's only one: the host CPU)
///
/// Carries the launch limits the emulated device enforces. The defaults
/// match a CUDA-class GPU; [`CpuDevice::with_limits`] tightens them.
#[derive(Clone, Debug, Default)]
pub struct CpuDevice {
    id: usize,
    limits: Option<DeviceLimits>,
}

impl CpuDevice {
    /// Create a new CPU device
    pub fn new() -> Self {
        Self { id: 0, limits: None }
    }

    /// Create a CPU device that rejects launches outside `limits`
    pub fn with_limits(limits: DeviceLimits) -> Self {
        Self {
            id: 0,
            limits: Some(limits),
        }
    }
}

impl Device for CpuDevice {
    fn id(&self) -> usize {
        self.id
    }

    fn name(&self) -> String {
        "cpu".to_string()
    }

    fn limits(&self) -> DeviceLimits {
        self.limits.unwrap_or_default()
    }
}
