//! Integration tests for the copy entry points on the CPU runtime
//!
//! Tests verify:
//! - Exact copies for every strategy and boundary counts
//! - Nothing past `n` is written
//! - Launch rejection surfaces as `Error::LaunchFailed`

mod common;

use common::{
    SENTINEL_F32, SENTINEL_I32, assert_bits_eq_f32, create_cpu_client, random_f32, random_i32,
    random_i64, src_dst_pair,
};
use gpucopy::buffer::DeviceBuffer;
use gpucopy::error::Error;
use gpucopy::ops::memcpy;
use gpucopy::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
use gpucopy::runtime::{DeviceLimits, RuntimeClient};

/// Counts around every granularity boundary of the three strategies
const BOUNDARY_COUNTS: &[usize] = &[
    1, 2, 3, 4, 5, 7, 8, 9, 63, 64, 65, 127, 128, 129, 255, 256, 257, 511, 512, 513, 1023, 1027,
];

fn run_f32(
    copy: unsafe fn(&CpuClient, usize, u64, u64) -> gpucopy::error::Result<()>,
    data: &[f32],
    extra: usize,
) -> Vec<f32> {
    let (client, device) = create_cpu_client();
    let (src, dst) = src_dst_pair::<CpuRuntime, f32>(data, extra, SENTINEL_F32, &device);
    unsafe { copy(&client, data.len(), src.ptr(), dst.ptr()).unwrap() };
    client.synchronize().unwrap();
    dst.to_vec::<f32>().unwrap()
}

fn run_i32(
    copy: unsafe fn(&CpuClient, usize, u64, u64) -> gpucopy::error::Result<()>,
    data: &[i32],
    extra: usize,
) -> Vec<i32> {
    let (client, device) = create_cpu_client();
    let (src, dst) = src_dst_pair::<CpuRuntime, i32>(data, extra, SENTINEL_I32, &device);
    unsafe { copy(&client, data.len(), src.ptr(), dst.ptr()).unwrap() };
    client.synchronize().unwrap();
    dst.to_vec::<i32>().unwrap()
}

// ============================================================================
// Zero and single element
// ============================================================================

#[test]
fn test_zero_elements_leave_destination_untouched() {
    let (client, device) = create_cpu_client();
    let (src, dst) = src_dst_pair::<CpuRuntime, f32>(&[1.0, 2.0, 3.0, 4.0], 0, SENTINEL_F32, &device);
    let (isrc, idst) = src_dst_pair::<CpuRuntime, i64>(&[5, 6], 0, -1, &device);

    unsafe {
        memcpy::memcpy_float::<CpuRuntime>(&client, 0, src.ptr(), dst.ptr()).unwrap();
        memcpy::memcpy_float_looped::<CpuRuntime>(&client, 0, src.ptr(), dst.ptr()).unwrap();
        memcpy::scalar_copy_i64::<CpuRuntime>(&client, 0, isrc.ptr(), idst.ptr()).unwrap();
        memcpy::vector_copy_i64::<CpuRuntime>(&client, 0, isrc.ptr(), idst.ptr()).unwrap();
    }
    client.synchronize().unwrap();

    assert!(dst.to_vec::<f32>().unwrap().iter().all(|&x| x == SENTINEL_F32));
    assert_eq!(idst.to_vec::<i64>().unwrap(), vec![-1, -1]);
}

#[test]
fn test_single_element_every_strategy() {
    let out = run_f32(memcpy::memcpy_float::<CpuRuntime>, &[42.5], 3);
    assert_eq!(out, vec![42.5, SENTINEL_F32, SENTINEL_F32, SENTINEL_F32]);

    let out = run_i32(memcpy::scalar_copy_i32::<CpuRuntime>, &[9], 1);
    assert_eq!(out, vec![9, SENTINEL_I32]);

    let out = run_i32(memcpy::vector_copy_i32::<CpuRuntime>, &[9], 1);
    assert_eq!(out, vec![9, SENTINEL_I32]);
}

// ============================================================================
// Strategy equivalence
// ============================================================================

#[test]
fn test_scalar_and_vector_agree_on_large_odd_count() {
    let data = random_i32(1_000_003, 7);
    let scalar = run_i32(memcpy::scalar_copy_i32::<CpuRuntime>, &data, 0);
    let vector = run_i32(memcpy::vector_copy_i32::<CpuRuntime>, &data, 0);
    assert_eq!(scalar, data);
    assert_eq!(vector, scalar);
}

#[test]
fn test_i64_scalar_and_vector() {
    let (client, device) = create_cpu_client();
    for &n in BOUNDARY_COUNTS {
        let data = random_i64(n, n as u64);
        for vector in [false, true] {
            let (src, dst) = src_dst_pair::<CpuRuntime, i64>(&data, 2, i64::MAX, &device);
            let result = unsafe {
                if vector {
                    memcpy::vector_copy_i64::<CpuRuntime>(&client, n, src.ptr(), dst.ptr())
                } else {
                    memcpy::scalar_copy_i64::<CpuRuntime>(&client, n, src.ptr(), dst.ptr())
                }
            };
            result.unwrap();
            client.synchronize().unwrap();
            let out = dst.to_vec::<i64>().unwrap();
            assert_eq!(&out[..n], &data[..], "n={} vector={}", n, vector);
            assert_eq!(&out[n..], &[i64::MAX, i64::MAX], "n={} vector={}", n, vector);
        }
    }
}

#[test]
fn test_memcpy_float_256() {
    let data: Vec<f32> = (0..256).map(|i| i as f32).collect();
    let out = run_f32(memcpy::memcpy_float::<CpuRuntime>, &data, 0);
    assert_eq!(out, data);
}

#[test]
fn test_float_copies_preserve_bits() {
    let mut data = random_f32(515, 3);
    data[0] = f32::NAN;
    data[1] = -0.0;
    data[514] = f32::from_bits(0x7fc0_1234);
    let out = run_f32(memcpy::memcpy_float::<CpuRuntime>, &data, 0);
    assert_bits_eq_f32(&out, &data, "memcpy_float");
}

// ============================================================================
// Remainders and tails
// ============================================================================

#[test]
fn test_vector_remainder_counts() {
    // Remainder elements must be copied even when the word count is not a
    // multiple of the thread count.
    for &n in BOUNDARY_COUNTS {
        let data = random_i32(n, 100 + n as u64);
        let out = run_i32(memcpy::vector_copy_i32::<CpuRuntime>, &data, 5);
        assert_eq!(&out[..n], &data[..], "n={}", n);
        assert!(out[n..].iter().all(|&x| x == SENTINEL_I32), "n={}", n);
    }
}

#[test]
fn test_blocked_boundaries_both_variants() {
    for &n in BOUNDARY_COUNTS {
        let data = random_f32(n, 200 + n as u64);
        let single = run_f32(memcpy::memcpy_float::<CpuRuntime>, &data, 4);
        let looped = run_f32(memcpy::memcpy_float_looped::<CpuRuntime>, &data, 4);
        assert_eq!(&single[..n], &data[..], "single-pass n={}", n);
        assert_eq!(&looped[..n], &data[..], "grid-stride n={}", n);
        assert!(single[n..].iter().all(|&x| x == SENTINEL_F32), "n={}", n);
        assert!(looped[n..].iter().all(|&x| x == SENTINEL_F32), "n={}", n);
    }
}

#[test]
fn test_looped_variant_covers_more_than_its_grid() {
    // 64 groups x 64 threads x 8 floats = 32768 floats per sweep
    let data = random_f32(1_000_003, 11);
    let out = run_f32(memcpy::memcpy_float_looped::<CpuRuntime>, &data, 0);
    assert_eq!(out, data);
}

#[test]
fn test_copy_is_idempotent() {
    let (client, device) = create_cpu_client();
    let data = random_f32(4099, 5);
    let (src, dst) = src_dst_pair::<CpuRuntime, f32>(&data, 0, SENTINEL_F32, &device);

    unsafe {
        memcpy::memcpy_float::<CpuRuntime>(&client, data.len(), src.ptr(), dst.ptr()).unwrap()
    };
    client.synchronize().unwrap();
    let first = dst.to_vec::<f32>().unwrap();

    unsafe {
        memcpy::memcpy_float::<CpuRuntime>(&client, data.len(), src.ptr(), dst.ptr()).unwrap()
    };
    client.synchronize().unwrap();
    let second = dst.to_vec::<f32>().unwrap();

    assert_bits_eq_f32(&first, &data, "first copy");
    assert_bits_eq_f32(&second, &first, "second copy");
    assert_eq!(src.to_vec::<f32>().unwrap(), data);
}

#[test]
fn test_scalar_copy_accepts_unaligned_pointers() {
    let (client, device) = create_cpu_client();
    let data = random_i32(101, 9);
    let (src, dst) = src_dst_pair::<CpuRuntime, i32>(&data, 0, SENTINEL_I32, &device);
    // Skip the first element of each buffer: 4-byte aligned only
    let offset = std::mem::size_of::<i32>() as u64;
    unsafe {
        memcpy::scalar_copy_i32::<CpuRuntime>(&client, 100, src.ptr() + offset, dst.ptr() + offset)
            .unwrap()
    };
    client.synchronize().unwrap();
    let out = dst.to_vec::<i32>().unwrap();
    assert_eq!(out[0], SENTINEL_I32);
    assert_eq!(&out[1..], &data[1..]);
}

// ============================================================================
// Launch failures
// ============================================================================

fn limited_client(max_groups: usize) -> CpuClient {
    CpuClient::new(CpuDevice::with_limits(DeviceLimits {
        max_threads_per_group: 1024,
        max_groups,
    }))
}

#[test]
fn test_oversized_grid_reports_launch_failure() {
    // One group of the single pass covers 64 threads x 8 floats
    let client = limited_client(1);
    let device = CpuDevice::new();
    let data = random_f32(1000, 1);
    let (src, dst) = src_dst_pair::<CpuRuntime, f32>(&data, 0, SENTINEL_F32, &device);

    let err = unsafe {
        memcpy::memcpy_float::<CpuRuntime>(&client, data.len(), src.ptr(), dst.ptr())
    }
    .unwrap_err();
    assert!(err.is_launch_failure(), "unexpected error: {}", err);
    assert!(err.to_string().contains("blocked_copy_k2_f32"));

    // The rejected launch never ran and the flag was cleared
    client.synchronize().unwrap();
    assert!(dst.to_vec::<f32>().unwrap().iter().all(|&x| x == SENTINEL_F32));
    unsafe { memcpy::memcpy_float::<CpuRuntime>(&client, 512, src.ptr(), dst.ptr()).unwrap() };
    client.synchronize().unwrap();
    let out = dst.to_vec::<f32>().unwrap();
    assert_bits_eq_f32(&out[..512], &data[..512], "after rejection");
    assert!(out[512..].iter().all(|&x| x == SENTINEL_F32));
}

#[test]
fn test_grid_stride_kernels_fit_small_group_limits() {
    let client = limited_client(4);
    let device = CpuDevice::new();
    let data = random_i32(100_000, 4);

    let (src, dst) = src_dst_pair::<CpuRuntime, i32>(&data, 0, SENTINEL_I32, &device);
    unsafe {
        memcpy::scalar_copy_i32::<CpuRuntime>(&client, data.len(), src.ptr(), dst.ptr()).unwrap()
    };
    client.synchronize().unwrap();
    assert_eq!(dst.to_vec::<i32>().unwrap(), data);

    let (src, dst) = src_dst_pair::<CpuRuntime, i32>(&data, 0, SENTINEL_I32, &device);
    unsafe {
        memcpy::vector_copy_i32::<CpuRuntime>(&client, data.len(), src.ptr(), dst.ptr()).unwrap()
    };
    client.synchronize().unwrap();
    assert_eq!(dst.to_vec::<i32>().unwrap(), data);

    let floats = random_f32(100_000, 5);
    let (src, dst) = src_dst_pair::<CpuRuntime, f32>(&floats, 0, SENTINEL_F32, &device);
    unsafe {
        memcpy::memcpy_float_looped::<CpuRuntime>(&client, floats.len(), src.ptr(), dst.ptr())
            .unwrap()
    };
    client.synchronize().unwrap();
    assert_bits_eq_f32(&dst.to_vec::<f32>().unwrap(), &floats, "looped");
}

#[test]
fn test_capped_grid_fits_where_single_pass_does_not() {
    let client = limited_client(64);
    let device = CpuDevice::new();
    let data = random_f32(100_000, 2);
    let (src, dst) = src_dst_pair::<CpuRuntime, f32>(&data, 0, SENTINEL_F32, &device);

    let err = unsafe {
        memcpy::memcpy_float::<CpuRuntime>(&client, data.len(), src.ptr(), dst.ptr())
    }
    .unwrap_err();
    assert!(matches!(err, Error::LaunchFailed { backend: "cpu", .. }));

    unsafe {
        memcpy::memcpy_float_looped::<CpuRuntime>(&client, data.len(), src.ptr(), dst.ptr())
            .unwrap()
    };
    client.synchronize().unwrap();
    assert_eq!(dst.to_vec::<f32>().unwrap(), data);
}

#[test]
fn test_buffers_keep_their_device() {
    let device = CpuDevice::new();
    let buf = DeviceBuffer::<CpuRuntime>::from_slice(&[1u32, 2, 3], &device).unwrap();
    assert_eq!(buf.len(), 3);
    assert_eq!(buf.to_vec::<u32>().unwrap(), vec![1, 2, 3]);
}
