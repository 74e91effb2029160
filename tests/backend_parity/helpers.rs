//! Shared helpers for backend parity tests: backend locks, client creation,
//! and a backend-generic copy runner.

#[cfg(feature = "cuda")]
use crate::common::create_cuda_client;
#[cfg(feature = "wgpu")]
use crate::common::create_wgpu_client;
use gpucopy::buffer::DeviceBuffer;
use gpucopy::dtype::Element;
use gpucopy::error::Result;
use gpucopy::runtime::{Runtime, RuntimeClient};
#[cfg(any(feature = "cuda", feature = "wgpu"))]
use std::sync::{Mutex, OnceLock};

#[cfg(feature = "cuda")]
static CUDA_BACKEND_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
#[cfg(feature = "wgpu")]
static WGPU_BACKEND_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Copy entry point under test, monomorphized for one runtime
pub type CopyFn<R> = unsafe fn(&<R as Runtime>::Client, usize, u64, u64) -> Result<()>;

/// Run `copy` over `data` into a sentinel-filled destination `extra`
/// elements longer than `data`, and read the destination back.
pub fn run_copy<R: Runtime, T: Element>(
    client: &R::Client,
    device: &R::Device,
    copy: CopyFn<R>,
    data: &[T],
    extra: usize,
    sentinel: T,
) -> Vec<T> {
    let src = DeviceBuffer::<R>::from_slice(data, device).expect("allocate src");
    let dst = DeviceBuffer::<R>::from_slice(&vec![sentinel; data.len() + extra], device)
        .expect("allocate dst");
    unsafe { copy(client, data.len(), src.ptr(), dst.ptr()) }.expect("copy");
    client.synchronize().expect("synchronize");
    dst.to_vec::<T>().expect("read back")
}

pub fn assert_parity<T: Element>(cpu: &[T], backend: &[T], op: &str, backend_name: &str) {
    assert_eq!(
        cpu.len(),
        backend.len(),
        "parity[{op}_{backend_name}]: length mismatch"
    );
    for (i, (x, y)) in cpu.iter().zip(backend).enumerate() {
        assert!(
            bytemuck::bytes_of(x) == bytemuck::bytes_of(y),
            "parity[{op}_{backend_name}] at index {i}: {x:?} vs {y:?}"
        );
    }
}

#[cfg(feature = "cuda")]
pub fn with_cuda_backend<F>(mut f: F)
where
    F: FnMut(gpucopy::runtime::cuda::CudaClient, gpucopy::runtime::cuda::CudaDevice),
{
    let _guard = CUDA_BACKEND_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let Some((client, device)) = create_cuda_client() else {
        println!("CUDA not available, skipping parity test");
        return;
    };
    f(client, device);
}

#[cfg(feature = "wgpu")]
pub fn with_wgpu_backend<F>(mut f: F)
where
    F: FnMut(gpucopy::runtime::wgpu::WgpuClient, gpucopy::runtime::wgpu::WgpuDevice),
{
    let _guard = WGPU_BACKEND_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    let Some((client, device)) = create_wgpu_client() else {
        println!("WebGPU not available, skipping parity test");
        return;
    };
    f(client, device);
}
