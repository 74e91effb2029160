//! Sticky per-stream launch error flag

use crate::error::{Error, Result};
use crate::ops::launch::LaunchGeometry;
use crate::runtime::DeviceLimits;
use parking_lot::Mutex;
use std::sync::Arc;

/// Most recent launch error recorded on a stream.
///
/// Mirrors the driver-level "last error" query: a rejected launch is recorded
/// here instead of failing the enqueue call, and the next
/// [`take`](Self::take) reports and clears it. Clones share the same slot.
#[derive(Clone, Default)]
pub(crate) struct ErrorFlag {
    slot: Arc<Mutex<Option<Error>>>,
}

impl ErrorFlag {
    /// Record `err`, replacing any error not yet observed.
    pub(crate) fn record(&self, err: Error) {
        tracing::error!(error = %err, "kernel launch rejected");
        *self.slot.lock() = Some(err);
    }

    /// Check `geometry` against `limits` before a launch of `kernel`.
    ///
    /// A geometry the device cannot run is recorded as a launch failure and
    /// `false` is returned; the caller then skips the launch.
    pub(crate) fn admit(
        &self,
        backend: &'static str,
        kernel: &str,
        limits: &DeviceLimits,
        geometry: &LaunchGeometry,
    ) -> bool {
        match limits.check(geometry) {
            Ok(()) => true,
            Err(e) => {
                self.record(Error::launch_failed(backend, kernel, e.to_string()));
                false
            }
        }
    }

    /// Report and clear the recorded error.
    pub(crate) fn take(&self) -> Result<()> {
        match self.slot.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for ErrorFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorFlag")
            .field("pending", &self.slot.lock().is_some())
            .finish()
    }
}
