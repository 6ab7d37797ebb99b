//! Background job runner service
//!
//! Runs blocking work on worker threads. Every job reports on one shared
//! channel, so results are observed in the order they finish, not the order
//! they were spawned. A job that panics still reports, with no value.

use std::collections::HashMap;
use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

/// A job that has finished on its worker thread
#[derive(Debug)]
pub struct Finished<K, T> {
    pub key: K,
    /// `None` when the job panicked
    pub value: Option<T>,
    pub elapsed: Duration,
}

/// Job runner keyed by `K`, producing values of type `T`
pub struct JobRunner<K, T> {
    sender: Sender<(K, Option<T>)>,
    receiver: Receiver<(K, Option<T>)>,
    /// Start instants of jobs that have not reported yet
    running: HashMap<K, Instant>,
}

impl<K, T> Default for JobRunner<K, T>
where
    K: Copy + Eq + Hash + Send + 'static,
    T: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> JobRunner<K, T>
where
    K: Copy + Eq + Hash + Send + 'static,
    T: Send + 'static,
{
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            running: HashMap::new(),
        }
    }

    /// Spawn `job` on a worker thread under `key`
    pub fn spawn<F>(&mut self, key: K, job: F)
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let tx = self.sender.clone();
        thread::spawn(move || {
            let value = panic::catch_unwind(AssertUnwindSafe(job)).ok();
            if value.is_none() {
                tracing::error!("background job panicked");
            }
            // The runner may have been dropped while we worked
            let _ = tx.send((key, value));
        });
        self.running.insert(key, Instant::now());
    }

    /// Number of jobs that have not reported yet
    pub fn in_flight(&self) -> usize {
        self.running.len()
    }

    /// Keys of jobs that have not reported yet, in no particular order
    pub fn running(&self) -> impl Iterator<Item = K> + '_ {
        self.running.keys().copied()
    }

    pub fn is_running(&self, key: K) -> bool {
        self.running.contains_key(&key)
    }

    /// Drain every job that has finished since the last poll, in arrival order
    pub fn poll(&mut self) -> Vec<Finished<K, T>> {
        let mut finished = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(message) => finished.push(self.finish(message)),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        finished
    }

    /// Block until the next job finishes.
    ///
    /// Returns `None` immediately when nothing is running, or when `timeout`
    /// elapses first.
    pub fn wait(&mut self, timeout: Option<Duration>) -> Option<Finished<K, T>> {
        if self.running.is_empty() {
            return None;
        }
        let message = match timeout {
            Some(timeout) => match self.receiver.recv_timeout(timeout) {
                Ok(message) => message,
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None
                }
            },
            None => self.receiver.recv().ok()?,
        };
        Some(self.finish(message))
    }

    fn finish(&mut self, (key, value): (K, Option<T>)) -> Finished<K, T> {
        let elapsed = self
            .running
            .remove(&key)
            .map(|started| started.elapsed())
            .unwrap_or_default();
        Finished {
            key,
            value,
            elapsed,
        }
    }
}
