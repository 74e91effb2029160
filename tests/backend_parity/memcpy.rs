//! Parity of every copy entry point between the CPU device and GPU backends

use crate::backend_parity::helpers::{CopyFn, assert_parity, run_copy};
#[cfg(feature = "cuda")]
use crate::backend_parity::helpers::with_cuda_backend;
#[cfg(feature = "wgpu")]
use crate::backend_parity::helpers::with_wgpu_backend;
use crate::common::{SENTINEL_F32, SENTINEL_I32, create_cpu_client, random_f32, random_i32, random_i64};
use gpucopy::ops::memcpy;
use gpucopy::runtime::Runtime;
use gpucopy::runtime::cpu::CpuRuntime;

const COUNTS: &[usize] = &[0, 1, 3, 4, 5, 255, 256, 257, 4099, 100_003];

fn i32_entry_points<R: Runtime>() -> [(&'static str, CopyFn<R>); 2] {
    [
        ("scalar_copy_i32", memcpy::scalar_copy_i32::<R>),
        ("vector_copy_i32", memcpy::vector_copy_i32::<R>),
    ]
}

fn i64_entry_points<R: Runtime>() -> [(&'static str, CopyFn<R>); 2] {
    [
        ("scalar_copy_i64", memcpy::scalar_copy_i64::<R>),
        ("vector_copy_i64", memcpy::vector_copy_i64::<R>),
    ]
}

fn f32_entry_points<R: Runtime>() -> [(&'static str, CopyFn<R>); 2] {
    [
        ("memcpy_float", memcpy::memcpy_float::<R>),
        ("memcpy_float_looped", memcpy::memcpy_float_looped::<R>),
    ]
}

/// Run every entry point on `R` and compare with the CPU device.
fn check_backend<R: Runtime>(client: &R::Client, device: &R::Device, backend: &str) {
    let (cpu_client, cpu_device) = create_cpu_client();

    for &n in COUNTS {
        let data = random_i32(n, n as u64);
        for ((op, cpu_copy), (_, copy)) in i32_entry_points::<CpuRuntime>()
            .into_iter()
            .zip(i32_entry_points::<R>())
        {
            let expected =
                run_copy::<CpuRuntime, i32>(&cpu_client, &cpu_device, cpu_copy, &data, 3, SENTINEL_I32);
            let actual = run_copy::<R, i32>(client, device, copy, &data, 3, SENTINEL_I32);
            assert_parity(&expected, &actual, &format!("{op}_n{n}"), backend);
        }

        let data = random_i64(n, n as u64 + 1);
        for ((op, cpu_copy), (_, copy)) in i64_entry_points::<CpuRuntime>()
            .into_iter()
            .zip(i64_entry_points::<R>())
        {
            let expected =
                run_copy::<CpuRuntime, i64>(&cpu_client, &cpu_device, cpu_copy, &data, 3, -1);
            let actual = run_copy::<R, i64>(client, device, copy, &data, 3, -1);
            assert_parity(&expected, &actual, &format!("{op}_n{n}"), backend);
        }

        let data = random_f32(n, n as u64 + 2);
        for ((op, cpu_copy), (_, copy)) in f32_entry_points::<CpuRuntime>()
            .into_iter()
            .zip(f32_entry_points::<R>())
        {
            let expected =
                run_copy::<CpuRuntime, f32>(&cpu_client, &cpu_device, cpu_copy, &data, 3, SENTINEL_F32);
            let actual = run_copy::<R, f32>(client, device, copy, &data, 3, SENTINEL_F32);
            assert_parity(&expected, &actual, &format!("{op}_n{n}"), backend);
        }
    }
}

#[test]
fn test_cpu_reference_is_exact() {
    let (client, device) = create_cpu_client();
    for &n in COUNTS {
        let data = random_f32(n, 42);
        for (op, copy) in f32_entry_points::<CpuRuntime>() {
            let out = run_copy::<CpuRuntime, f32>(&client, &device, copy, &data, 2, SENTINEL_F32);
            assert_parity(&data, &out[..n], op, "cpu");
            assert_eq!(&out[n..], &[SENTINEL_F32, SENTINEL_F32], "{op} n={n}");
        }
    }
}

#[test]
fn test_memcpy_parity() {
    #[cfg(feature = "cuda")]
    with_cuda_backend(|client, device| {
        check_backend::<gpucopy::runtime::cuda::CudaRuntime>(&client, &device, "cuda")
    });

    #[cfg(feature = "wgpu")]
    with_wgpu_backend(|client, device| {
        check_backend::<gpucopy::runtime::wgpu::WgpuRuntime>(&client, &device, "wgpu")
    });

    // Without a GPU feature, the CPU device is compared with itself
    let (client, device) = create_cpu_client();
    check_backend::<CpuRuntime>(&client, &device, "cpu");
}
