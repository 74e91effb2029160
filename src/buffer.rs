//! Device buffers and the checked copy API

use crate::dtype::{DType, Element, WIDE_WORD_BYTES};
use crate::error::{Error, Result};
use crate::ops::launch::CopyStrategy;
use crate::ops::memcpy::copy_with;
use crate::runtime::{Device, Runtime, RuntimeClient};
use std::sync::Arc;

/// Typed region of device memory
///
/// Owns `len` elements of `dtype` on one device. Clones share the allocation
/// (reference counted); the memory is released when the last clone drops.
pub struct DeviceBuffer<R: Runtime> {
    inner: Arc<BufferInner<R>>,
}

struct BufferInner<R: Runtime> {
    /// Raw device pointer (GPU address, buffer handle, or CPU ptr cast to u64)
    ptr: u64,
    /// Number of elements (not bytes)
    len: usize,
    dtype: DType,
    device: R::Device,
}

/// Size of `len` elements of `dtype`; a count that overflows can never be allocated.
fn byte_len(len: usize, dtype: DType) -> Result<usize> {
    len.checked_mul(dtype.size_in_bytes())
        .ok_or(Error::OutOfMemory { size: usize::MAX })
}

impl<R: Runtime> DeviceBuffer<R> {
    /// Allocate `len` zero-initialised elements of `dtype`
    pub fn zeros(len: usize, dtype: DType, device: &R::Device) -> Result<Self> {
        let size_bytes = byte_len(len, dtype)?;
        let buffer = Self::allocate(len, dtype, device)?;
        if size_bytes > 0 {
            R::copy_to_device(&vec![0u8; size_bytes], buffer.ptr(), device)?;
        }
        Ok(buffer)
    }

    /// Allocate a buffer holding a copy of `data`
    ///
    /// The dtype is inferred from the element type.
    pub fn from_slice<T: Element>(data: &[T], device: &R::Device) -> Result<Self> {
        let buffer = Self::allocate(data.len(), T::DTYPE, device)?;
        R::copy_to_device(bytemuck::cast_slice(data), buffer.ptr(), device)?;
        Ok(buffer)
    }

    fn allocate(len: usize, dtype: DType, device: &R::Device) -> Result<Self> {
        let ptr = R::allocate(byte_len(len, dtype)?, device)?;
        Ok(Self {
            inner: Arc::new(BufferInner {
                ptr,
                len,
                dtype,
                device: device.clone(),
            }),
        })
    }

    /// Overwrite the first `data.len()` elements with `data`
    pub fn write<T: Element>(&self, data: &[T]) -> Result<()> {
        self.check_dtype::<T>()?;
        if data.len() > self.len() {
            return Err(Error::BufferTooSmall {
                needed: data.len(),
                len: self.len(),
            });
        }
        R::copy_to_device(bytemuck::cast_slice(data), self.ptr(), self.device())
    }

    /// Copy the buffer's contents to the host
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        self.check_dtype::<T>()?;
        // Allocate with T's alignment, then view as bytes for the transfer
        let mut result = vec![T::zeroed(); self.len()];
        R::copy_from_device(
            self.ptr(),
            bytemuck::cast_slice_mut(&mut result),
            self.device(),
        )?;
        Ok(result)
    }

    fn check_dtype<T: Element>(&self) -> Result<()> {
        if T::DTYPE != self.dtype() {
            return Err(Error::DTypeMismatch {
                lhs: T::DTYPE,
                rhs: self.dtype(),
            });
        }
        Ok(())
    }

    /// Get the raw device pointer
    #[inline]
    pub fn ptr(&self) -> u64 {
        self.inner.ptr
    }

    /// Get the number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len
    }

    /// Check if the buffer is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.len == 0
    }

    /// Get the element type
    #[inline]
    pub fn dtype(&self) -> DType {
        self.inner.dtype
    }

    /// Get the device
    #[inline]
    pub fn device(&self) -> &R::Device {
        &self.inner.device
    }

    /// Get size in bytes
    #[inline]
    pub fn size_in_bytes(&self) -> usize {
        self.inner.len * self.inner.dtype.size_in_bytes()
    }
}

impl<R: Runtime> Clone for DeviceBuffer<R> {
    /// Clone increments the reference count (zero-copy)
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Runtime> Drop for BufferInner<R> {
    fn drop(&mut self) {
        if self.ptr != 0 {
            R::deallocate(self.ptr, self.len * self.dtype.size_in_bytes(), &self.device);
        }
    }
}

impl<R: Runtime> std::fmt::Debug for DeviceBuffer<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("backend", &R::name())
            .field("ptr", &format!("0x{:x}", self.inner.ptr))
            .field("len", &self.inner.len)
            .field("dtype", &self.inner.dtype)
            .field("refs", &Arc::strong_count(&self.inner))
            .finish()
    }
}

// ============================================================================
// Checked copy
// ============================================================================

/// Copy the first `n` elements of `src` into `dst`, picking the strategy
/// with [`CopyStrategy::auto`].
///
/// Returns the strategy used. See [`copy_buffer_with`] for the checks made
/// and the completion guarantee.
pub fn copy_buffer<R: Runtime>(
    client: &R::Client,
    src: &DeviceBuffer<R>,
    dst: &DeviceBuffer<R>,
    n: usize,
) -> Result<CopyStrategy> {
    let wide_aligned = R::is_wide_aligned(src.ptr()) && R::is_wide_aligned(dst.ptr());
    let strategy = CopyStrategy::auto(src.dtype(), n, wide_aligned);
    copy_buffer_with(client, strategy, src, dst, n)?;
    Ok(strategy)
}

/// Copy the first `n` elements of `src` into `dst` with `strategy`.
///
/// Checks that both buffers share a dtype and live on the client's device,
/// that both hold at least `n` elements, that they are distinct, and that
/// the wide-word strategies get aligned buffers. The call returns after the
/// client's stream has drained, so the buffers may be dropped right away.
pub fn copy_buffer_with<R: Runtime>(
    client: &R::Client,
    strategy: CopyStrategy,
    src: &DeviceBuffer<R>,
    dst: &DeviceBuffer<R>,
    n: usize,
) -> Result<()> {
    if src.dtype() != dst.dtype() {
        return Err(Error::DTypeMismatch {
            lhs: src.dtype(),
            rhs: dst.dtype(),
        });
    }
    if !client.device().is_same(src.device()) || !client.device().is_same(dst.device()) {
        return Err(Error::DeviceMismatch);
    }
    for len in [src.len(), dst.len()] {
        if len < n {
            return Err(Error::BufferTooSmall { needed: n, len });
        }
    }
    if n > 0 && src.ptr() == dst.ptr() {
        return Err(Error::InvalidArgument {
            arg: "dst",
            reason: "source and destination overlap".to_string(),
        });
    }
    if strategy != CopyStrategy::Scalar {
        for ptr in [src.ptr(), dst.ptr()] {
            if !R::is_wide_aligned(ptr) {
                return Err(Error::Misaligned {
                    ptr,
                    align: WIDE_WORD_BYTES,
                });
            }
        }
    }

    crate::dispatch_dtype!(src.dtype(), T => {
        // SAFETY: dtype, capacity, device, distinctness and alignment were
        // checked above; both buffers outlive the synchronize below.
        unsafe { copy_with::<R, T>(client, strategy, n, src.ptr(), dst.ptr())? }
    });
    client.synchronize()
}
