//! Dedicated background thread that runs queued jobs one at a time.

use std::thread::{JoinHandle, ThreadId};

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use tracing::{debug, error};

use mockloc_core::error::SequencerError;

/// Unit of work executed on the worker thread.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Single-thread FIFO job queue.
///
/// Jobs run serially in submission order. Closing the queue lets jobs that
/// were already submitted finish; the thread exits once the queue drains.
pub struct Worker {
    name: String,
    sender: Mutex<Option<Sender<Job>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    thread_id: ThreadId,
}

impl Worker {
    /// Spawn the worker thread.
    pub fn spawn(name: &str) -> Result<Self, SequencerError> {
        let (tx, rx) = crossbeam_channel::unbounded::<Job>();
        let thread_name = name.to_string();
        let handle = std::thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                debug!(worker = %thread_name, "Worker started");
                for job in rx {
                    job();
                }
                debug!(worker = %thread_name, "Worker exiting");
            })
            .map_err(|e| SequencerError::Worker(e.to_string()))?;
        let thread_id = handle.thread().id();

        Ok(Self {
            name: name.to_string(),
            sender: Mutex::new(Some(tx)),
            handle: Mutex::new(Some(handle)),
            thread_id,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue a job behind any jobs already submitted.
    pub fn submit(&self, job: Job) -> Result<(), SequencerError> {
        let sender = self.sender.lock();
        let Some(tx) = sender.as_ref() else {
            return Err(SequencerError::Worker(format!("{} is closed", self.name)));
        };
        tx.send(job)
            .map_err(|_| SequencerError::Worker(format!("{} has exited", self.name)))
    }

    /// Stop accepting jobs.
    pub fn close(&self) {
        self.sender.lock().take();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Whether the caller is running on the worker thread.
    #[must_use]
    pub fn is_current(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Close the queue and wait for the thread to exit.
    ///
    /// Called from the worker thread itself, only the queue is closed.
    pub fn join(&self) {
        self.close();
        if self.is_current() {
            return;
        }
        if let Some(handle) = self.handle.lock().take() {
            if handle.join().is_err() {
                error!(worker = %self.name, "Worker thread panicked");
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.join();
    }
}
