use crossbeam::channel::{Receiver, Sender, unbounded};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::registry::ThreadRegistry;
use crate::errors::{PatternError, PatternResult};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed set of worker threads fed through a shared job channel.
///
/// Every worker registers itself with the registry before taking work and
/// deregisters on exit, so jobs can look up their worker id.
pub struct WorkerPool {
    job_tx: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `threads` workers. Zero is allowed; such a pool accepts jobs but
    /// never runs them, so callers check `size()` first.
    pub fn initialise(threads: usize, registry: Arc<ThreadRegistry>) -> PatternResult<Self> {
        let (job_tx, job_rx) = unbounded::<Job>();
        let mut pool = Self {
            job_tx: Some(job_tx),
            workers: Vec::with_capacity(threads),
        };

        for worker_id in 0..threads {
            let job_rx = job_rx.clone();
            let registry = registry.clone();
            let handle = thread::Builder::new()
                .name(format!("parapat-worker-{worker_id}"))
                .spawn(move || worker_thread(worker_id, job_rx, registry))
                .map_err(PatternError::SpawnFailed)?;
            pool.workers.push(handle);
        }

        tracing::debug!(workers = threads, "worker pool started");
        Ok(pool)
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue a job for the next idle worker.
    pub fn submit<F>(&self, task: F) -> PatternResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let job_tx = self.job_tx.as_ref().ok_or(PatternError::PoolClosed)?;
        job_tx
            .send(Box::new(task))
            .map_err(|_| PatternError::PoolClosed)
    }

    /// Stop accepting work, let queued jobs drain and join every worker.
    pub fn shutdown(&mut self) {
        if self.job_tx.take().is_none() {
            return;
        }
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("worker thread exited with a panic");
            }
        }
        tracing::debug!("worker pool stopped");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_thread(worker_id: usize, job_rx: Receiver<Job>, registry: Arc<ThreadRegistry>) {
    registry.register_thread();
    tracing::trace!(worker_id, "worker registered");

    while let Ok(job) = job_rx.recv() {
        // A panicking job must not take the worker down with it.
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            tracing::warn!(worker_id, "job panicked");
        }
    }

    registry.deregister_thread();
    tracing::trace!(worker_id, "worker deregistered");
}
