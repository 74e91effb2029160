//! FIFO execution stream for the emulated device

use crate::error::{Error, Result};
use parking_lot::{Condvar, Mutex};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Sender, channel};
use std::thread::JoinHandle;

type Job = Box<dyn FnOnce() + Send + 'static>;

static STREAM_ID: AtomicUsize = AtomicUsize::new(0);

#[derive(Default)]
struct Progress {
    /// Jobs enqueued but not yet finished
    pending: usize,
    /// First fault raised by a job since the last synchronize
    fault: Option<String>,
}

#[derive(Default)]
struct Shared {
    progress: Mutex<Progress>,
    drained: Condvar,
}

impl Shared {
    fn finish(&self, outcome: std::thread::Result<()>) {
        let mut progress = self.progress.lock();
        progress.pending -= 1;
        if let Err(payload) = outcome {
            let msg = panic_message(payload.as_ref());
            progress.fault.get_or_insert(msg);
        }
        if progress.pending == 0 {
            self.drained.notify_all();
        }
    }
}

/// Ordered work queue executed by a dedicated worker thread.
///
/// Jobs run one at a time in submission order. Enqueue never blocks on job
/// execution. A job that panics is recorded as a stream fault and reported
/// by the next [`synchronize`](Self::synchronize); later jobs still run.
///
/// If the worker thread cannot be spawned the stream degrades to running
/// jobs inline on the enqueuing thread, which preserves ordering.
pub(crate) struct CpuStream {
    id: usize,
    sender: Mutex<Option<Sender<Job>>>,
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl CpuStream {
    pub(crate) fn new() -> Self {
        let id = STREAM_ID.fetch_add(1, Ordering::Relaxed);
        let shared = Arc::new(Shared::default());
        let (sender, receiver) = channel::<Job>();

        let worker_shared = shared.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("gpucopy-cpu-stream-{id}"))
            .spawn(move || {
                tracing::trace!(stream = id, "cpu stream worker started");
                for job in receiver {
                    let outcome = catch_unwind(AssertUnwindSafe(job));
                    worker_shared.finish(outcome);
                }
                tracing::trace!(stream = id, "cpu stream worker stopped");
            });

        let (sender, worker) = match spawned {
            Ok(handle) => (Some(sender), Some(handle)),
            Err(e) => {
                tracing::warn!(stream = id, error = %e, "cpu stream worker unavailable, running inline");
                (None, None)
            }
        };

        Self {
            id,
            sender: Mutex::new(sender),
            shared,
            worker: Mutex::new(worker),
        }
    }

    /// Stream identifier (unique per process)
    pub(crate) fn id(&self) -> usize {
        self.id
    }

    /// Append a job to the queue.
    pub(crate) fn enqueue<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.progress.lock().pending += 1;

        let job: Job = Box::new(job);
        let rejected = match self.sender.lock().as_ref() {
            Some(sender) => sender.send(job).err().map(|e| e.0),
            None => Some(job),
        };

        // No worker: run inline, still in submission order
        if let Some(job) = rejected {
            let outcome = catch_unwind(AssertUnwindSafe(job));
            self.shared.finish(outcome);
        }
    }

    /// Block until every enqueued job has finished.
    pub(crate) fn synchronize(&self) -> Result<()> {
        let mut progress = self.shared.progress.lock();
        while progress.pending > 0 {
            self.shared.drained.wait(&mut progress);
        }
        match progress.fault.take() {
            Some(msg) => Err(Error::Backend(format!(
                "cpu stream {} faulted while executing: {}",
                self.id, msg
            ))),
            None => Ok(()),
        }
    }
}

impl Drop for CpuStream {
    fn drop(&mut self) {
        // Closing the channel lets the worker finish queued jobs and exit
        self.sender.lock().take();
        if let Some(handle) = self.worker.lock().take() {
            let _ = handle.join();
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
