//! CPU client and allocator implementation

use super::device::CpuDevice;
use super::runtime::{CpuRuntime, cpu_allocate, cpu_deallocate};
use super::stream::CpuStream;
use crate::error::Result;
use crate::runtime::error_flag::ErrorFlag;
use crate::runtime::{DefaultAllocator, RuntimeClient};
use std::sync::Arc;

/// CPU client for operation dispatch
///
/// Owns one FIFO stream. Clones share the stream and its error flag, so a
/// clone enqueues onto the same queue as the original.
#[derive(Clone)]
pub struct CpuClient {
    pub(crate) device: CpuDevice,
    allocator: CpuAllocator,
    pub(crate) stream: Arc<CpuStream>,
    pub(crate) last_error: ErrorFlag,
}

impl CpuClient {
    /// Create a new CPU client with its own stream
    pub fn new(device: CpuDevice) -> Self {
        let allocator = DefaultAllocator::new(device.clone(), cpu_allocate, cpu_deallocate);
        Self {
            device,
            allocator,
            stream: Arc::new(CpuStream::new()),
            last_error: ErrorFlag::default(),
        }
    }
}

impl std::fmt::Debug for CpuClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuClient")
            .field("device", &self.device)
            .field("stream", &self.stream.id())
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl RuntimeClient<CpuRuntime> for CpuClient {
    fn device(&self) -> &CpuDevice {
        &self.device
    }

    fn synchronize(&self) -> Result<()> {
        self.stream.synchronize()
    }

    fn allocator(&self) -> &CpuAllocator {
        &self.allocator
    }
}

/// CPU-specific allocator type alias
pub type CpuAllocator = DefaultAllocator<CpuDevice>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Allocator;

    #[test]
    fn test_clones_share_stream() {
        let client = CpuClient::new(CpuDevice::new());
        let other = client.clone();
        assert_eq!(client.stream.id(), other.stream.id());
        assert_ne!(
            client.stream.id(),
            CpuClient::new(CpuDevice::new()).stream.id()
        );
    }

    #[test]
    fn test_allocator_roundtrip() {
        let client = CpuClient::new(CpuDevice::new());
        let ptr = client.allocator().allocate(256).unwrap();
        assert_ne!(ptr, 0);
        assert_eq!(ptr % 64, 0);
        client.allocator().deallocate(ptr, 256);
        assert_eq!(client.allocator().allocate(0).unwrap(), 0);
    }
}
