//! Core trait for compute backends

use crate::ops::CopyKernels;

/// Core trait for compute backends
///
/// `Runtime` abstracts over different compute devices (emulated CPU device,
/// CUDA, WebGPU). It uses static dispatch via generics for zero-cost
/// abstraction; exactly one runtime is picked per call site at compile time.
///
/// # Associated Types
///
/// - `Device`: Identifies a specific compute unit (e.g., GPU 0, GPU 1)
/// - `Client`: Owns the stream; enqueues copy kernels and synchronizes
/// - `Allocator`: Memory management
///
/// # Example
///
/// ```ignore
/// let device = CpuRuntime::default_device();
/// let ptr = CpuRuntime::allocate(1024, &device)?;
/// // ... use memory ...
/// CpuRuntime::deallocate(ptr, 1024, &device);
/// ```
pub trait Runtime: Clone + Send + Sync + 'static {
    /// Device identifier type
    type Device: super::Device;

    /// Client for dispatching operations
    type Client: CopyKernels<Self>;

    /// Memory allocator type
    type Allocator: crate::runtime::Allocator;

    /// Human-readable name of this runtime
    fn name() -> &'static str;

    /// Allocate device memory
    ///
    /// Returns a device pointer (u64) that can be used for operations.
    /// Returns `Err(OutOfMemory)` if allocation fails.
    fn allocate(size_bytes: usize, device: &Self::Device) -> crate::error::Result<u64>;

    /// Deallocate device memory
    fn deallocate(ptr: u64, size_bytes: usize, device: &Self::Device);

    /// Copy data from host to device
    ///
    /// Ordered after all work already enqueued on the device's default
    /// client. Returns an error if the transfer fails.
    fn copy_to_device(src: &[u8], dst: u64, device: &Self::Device) -> crate::error::Result<()>;

    /// Copy data from device to host
    ///
    /// Waits for the device's default client to drain first. Returns an
    /// error if the transfer fails.
    fn copy_from_device(
        src: u64,
        dst: &mut [u8],
        device: &Self::Device,
    ) -> crate::error::Result<()>;

    /// Whether `ptr` may be passed to the wide-word (vector, register-blocked)
    /// kernels.
    ///
    /// Defaults to checking the address against the wide-word size. Backends
    /// whose pointers are handles rather than addresses override this.
    fn is_wide_aligned(ptr: u64) -> bool {
        ptr % crate::dtype::WIDE_WORD_BYTES as u64 == 0
    }

    /// Get the default device
    fn default_device() -> Self::Device;

    /// Get the default client (the default stream) for a device
    ///
    /// The client is created on first use and cached; later calls return a
    /// handle to the same stream. Fails if the backend cannot be initialised
    /// on this device.
    fn default_client(device: &Self::Device) -> crate::error::Result<Self::Client>;
}
