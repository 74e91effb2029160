//! Common test utilities
#![allow(dead_code)]

use gpucopy::buffer::DeviceBuffer;
use gpucopy::dtype::Element;
use gpucopy::runtime::Runtime;
use gpucopy::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
#[cfg(feature = "cuda")]
use gpucopy::runtime::cuda::{CudaClient, CudaDevice, CudaRuntime};
#[cfg(feature = "wgpu")]
use gpucopy::runtime::wgpu::{WgpuClient, WgpuDevice, WgpuRuntime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Sentinel written past the copied range to detect overruns
pub const SENTINEL_F32: f32 = -7.25;

/// Sentinel for integer buffers
pub const SENTINEL_I32: i32 = i32::MIN + 17;

/// Create a CPU client and device for testing
pub fn create_cpu_client() -> (CpuClient, CpuDevice) {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device).expect("CPU client is always available");
    (client, device)
}

/// Create a CUDA client and device, returning None if CUDA is unavailable
#[cfg(feature = "cuda")]
pub fn create_cuda_client() -> Option<(CudaClient, CudaDevice)> {
    if !gpucopy::runtime::cuda::is_cuda_available() {
        return None;
    }
    let device = CudaDevice::new(0);
    let client = CudaRuntime::default_client(&device).ok()?;
    Some((client, device))
}

/// Create a WebGPU client and device, returning None if WebGPU is unavailable
#[cfg(feature = "wgpu")]
pub fn create_wgpu_client() -> Option<(WgpuClient, WgpuDevice)> {
    if !gpucopy::runtime::wgpu::is_wgpu_available() {
        return None;
    }
    let device = WgpuDevice::new(0);
    let client = WgpuRuntime::default_client(&device).ok()?;
    Some((client, device))
}

/// Deterministic random f32 values
pub fn random_f32(n: usize, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.random_range(-1.0e6f32..1.0e6)).collect()
}

/// Deterministic random i32 values
pub fn random_i32(n: usize, seed: u64) -> Vec<i32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.random()).collect()
}

/// Deterministic random i64 values
pub fn random_i64(n: usize, seed: u64) -> Vec<i64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.random()).collect()
}

/// Source buffer holding `data` and a destination of `data.len() + extra`
/// elements filled with `sentinel`.
pub fn src_dst_pair<R: Runtime, T: Element>(
    data: &[T],
    extra: usize,
    sentinel: T,
    device: &R::Device,
) -> (DeviceBuffer<R>, DeviceBuffer<R>) {
    let src = DeviceBuffer::<R>::from_slice(data, device).expect("allocate src");
    let fill = vec![sentinel; data.len() + extra];
    let dst = DeviceBuffer::<R>::from_slice(&fill, device).expect("allocate dst");
    (src, dst)
}

/// Compare bit patterns so NaN payloads and signed zeros count as equal
pub fn assert_bits_eq_f32(actual: &[f32], expected: &[f32], msg: &str) {
    assert_eq!(actual.len(), expected.len(), "{}: length mismatch", msg);
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert_eq!(
            a.to_bits(),
            e.to_bits(),
            "{}: element {} differs: {} vs {}",
            msg,
            i,
            a,
            e
        );
    }
}
