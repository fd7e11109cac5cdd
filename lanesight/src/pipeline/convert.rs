use anyhow::{Context, Result};
use std::sync::mpsc;
use std::thread;
use tokio::sync::oneshot;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A dedicated single-threaded executor for pixel-format conversion work.
///
/// The platform graphics surface this pipeline was built against confines
/// format construction and overlay drawing to one thread; this executor
/// reproduces that constraint explicitly. Jobs run strictly in submission
/// order on a named worker thread and hand their result back through a
/// oneshot channel, so a caller can block on the hand-off and resume its
/// own work once the conversion is done.
pub struct ConversionExecutor {
    jobs: Option<mpsc::Sender<Job>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl ConversionExecutor {
    pub fn spawn() -> Result<Self> {
        let (jobs, queue) = mpsc::channel::<Job>();
        let worker = thread::Builder::new()
            .name("lanesight-convert".into())
            .spawn(move || {
                while let Ok(job) = queue.recv() {
                    job();
                }
            })
            .context("failed to start conversion thread")?;

        Ok(ConversionExecutor {
            jobs: Some(jobs),
            worker: Some(worker),
        })
    }

    /// Queues a job and returns the completion handle. If the executor is
    /// already shut down the handle resolves to a receive error and the
    /// caller treats the tick as cancelled.
    pub fn submit<T, F>(&self, job: F) -> oneshot::Receiver<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (done, handle) = oneshot::channel();
        let wrapped: Job = Box::new(move || {
            let _ = done.send(job());
        });
        if let Some(jobs) = &self.jobs {
            let _ = jobs.send(wrapped);
        }
        handle
    }

    /// Closes the queue and waits for the worker to drain and exit.
    pub fn shutdown(mut self) {
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for ConversionExecutor {
    fn drop(&mut self) {
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
