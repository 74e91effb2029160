//! CUDA Device implementation
//!
//! Provides CUDA device abstraction using cudarc for direct GPU control.

use crate::error::Result;
use crate::runtime::{Device, DeviceLimits};
use cudarc::driver::sys::CUdevice_attribute;

/// CUDA Device using cudarc
///
/// Represents a single GPU device. Used by CudaClient for stream management.
#[derive(Clone, Debug)]
pub struct CudaDevice {
    /// Index of the GPU device (0, 1, 2, ...)
    pub(crate) index: usize,
}

impl CudaDevice {
    /// Create a new CUDA device
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    fn attribute(&self, attr: CUdevice_attribute) -> Result<i32> {
        cudarc::driver::result::init()?;
        let device = cudarc::driver::result::device::get(self.index as i32)?;
        // SAFETY: `device` was just obtained from the driver for this index.
        let value = unsafe { cudarc::driver::result::device::get_attribute(device, attr) }?;
        Ok(value)
    }

    /// Get the compute capability of this CUDA device
    ///
    /// Returns (major, minor) version numbers (e.g., (8, 6) for sm_86 / RTX 3090)
    pub fn compute_capability(&self) -> Result<(u32, u32)> {
        let major =
            self.attribute(CUdevice_attribute::CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MAJOR)?;
        let minor =
            self.attribute(CUdevice_attribute::CU_DEVICE_ATTRIBUTE_COMPUTE_CAPABILITY_MINOR)?;
        Ok((major as u32, minor as u32))
    }

    /// Query the launch limits of this device from the driver
    pub fn query_limits(&self) -> Result<DeviceLimits> {
        let threads =
            self.attribute(CUdevice_attribute::CU_DEVICE_ATTRIBUTE_MAX_THREADS_PER_BLOCK)?;
        let groups = self.attribute(CUdevice_attribute::CU_DEVICE_ATTRIBUTE_MAX_GRID_DIM_X)?;
        Ok(DeviceLimits {
            max_threads_per_group: threads.max(0) as u32,
            max_groups: groups.max(0) as usize,
        })
    }
}

impl Device for CudaDevice {
    fn id(&self) -> usize {
        self.index
    }

    fn name(&self) -> String {
        format!("cuda:{}", self.index)
    }

    fn limits(&self) -> DeviceLimits {
        self.query_limits().unwrap_or_else(|e| {
            tracing::warn!(device = self.index, error = %e, "failed to query CUDA limits, using defaults");
            DeviceLimits::default()
        })
    }
}

impl Default for CudaDevice {
    fn default() -> Self {
        Self::new(0)
    }
}
