//! CopyKernels implementation for the CUDA runtime

use cudarc::driver::sys::CUresult;

use super::kernels::{
    blocked_kernel_name, check_blocking_factor, copy_kernel_name, launch_copy_kernel,
};
use super::{CudaClient, CudaRuntime};
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::ops::CopyKernels;
use crate::ops::launch::{BlockedVariant, LaunchGeometry};

const BACKEND: &str = "cuda";

impl CudaClient {
    /// Launch `kernel` if the geometry fits the device, recording any
    /// rejection in the error flag.
    unsafe fn launch_checked(
        &self,
        kernel: &str,
        geometry: &LaunchGeometry,
        n: usize,
        src: u64,
        dst: u64,
    ) -> Result<()> {
        if !self.last_error.admit(BACKEND, kernel, &self.limits, geometry) {
            return Ok(());
        }

        let outcome = unsafe {
            launch_copy_kernel(
                &self.context,
                &self.stream,
                self.device.index,
                kernel,
                geometry,
                n,
                src,
                dst,
            )?
        };
        if let Err(reason) = outcome {
            self.last_error
                .record(Error::launch_failed(BACKEND, kernel, reason));
        }
        Ok(())
    }
}

impl CopyKernels<CudaRuntime> for CudaClient {
    unsafe fn enqueue_scalar_copy<T: Element>(
        &self,
        geometry: LaunchGeometry,
        n: usize,
        src: u64,
        dst: u64,
    ) -> Result<()> {
        let kernel = copy_kernel_name("scalar", T::DTYPE);
        unsafe { self.launch_checked(&kernel, &geometry, n, src, dst) }
    }

    unsafe fn enqueue_vector_copy<T: Element>(
        &self,
        geometry: LaunchGeometry,
        n: usize,
        src: u64,
        dst: u64,
    ) -> Result<()> {
        let kernel = copy_kernel_name("vector", T::DTYPE);
        unsafe { self.launch_checked(&kernel, &geometry, n, src, dst) }
    }

    unsafe fn enqueue_blocked_copy<const K: usize>(
        &self,
        variant: BlockedVariant,
        geometry: LaunchGeometry,
        n: usize,
        src: u64,
        dst: u64,
    ) -> Result<()> {
        check_blocking_factor(K)?;
        let kernel = blocked_kernel_name(variant, K);
        unsafe { self.launch_checked(&kernel, &geometry, n, src, dst) }
    }

    fn check_last_error(&self) -> Result<()> {
        self.last_error.take()?;

        // Asynchronous faults from earlier work surface as a sticky stream error
        // SAFETY: the stream handle is owned by this client and still alive.
        let status = unsafe { cudarc::driver::sys::cuStreamQuery(self.stream.cu_stream()) };
        match status {
            CUresult::CUDA_SUCCESS | CUresult::CUDA_ERROR_NOT_READY => Ok(()),
            other => Err(Error::launch_failed(
                BACKEND,
                "stream",
                format!("{:?}", other),
            )),
        }
    }
}
