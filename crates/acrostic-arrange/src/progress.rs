// ProgressMonitor: periodic snapshots of what every search worker is doing.
//
// Workers register under a name and publish their current variant stack
// (the variant chosen for every slot placed so far). A ticker thread hands
// a snapshot of all active workers to a reporter at a fixed interval.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Receives progress snapshots from the ticker thread.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, snapshot: &ProgressSnapshot);
}

/// One active worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerProgress {
    pub name: String,
    /// Variant chosen for each slot placed so far.
    pub stack: Vec<usize>,
}

/// State of every active worker at one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Number of variants of each slot in the current candidate.
    pub max: Vec<usize>,
    pub workers: Vec<WorkerProgress>,
    /// Stacks published since the candidate began.
    pub updates: u64,
}

#[derive(Debug, Default)]
struct Board {
    max: Vec<usize>,
    workers: Vec<Option<WorkerProgress>>,
    updates: u64,
}

impl Board {
    fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            max: self.max.clone(),
            workers: self.workers.iter().flatten().cloned().collect(),
            updates: self.updates,
        }
    }
}

/// Shared progress board plus its ticker thread.
#[derive(Debug)]
pub struct ProgressMonitor {
    board: Arc<Mutex<Board>>,
    stop: Mutex<Option<Sender<()>>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl ProgressMonitor {
    /// A monitor without a ticker; snapshots are taken on demand.
    pub fn new() -> Self {
        Self {
            board: Arc::new(Mutex::new(Board::default())),
            stop: Mutex::new(None),
            ticker: Mutex::new(None),
        }
    }

    /// A monitor reporting to `reporter` every `interval`.
    pub fn start(interval: Duration, reporter: Arc<dyn ProgressReporter>) -> Self {
        let monitor = Self::new();
        let (tx, rx) = mpsc::channel::<()>();
        let board = Arc::clone(&monitor.board);
        let handle = thread::spawn(move || {
            loop {
                match rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let snapshot = lock(&board).snapshot();
                        reporter.report(&snapshot);
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });
        *lock(&monitor.stop) = Some(tx);
        *lock(&monitor.ticker) = Some(handle);
        monitor
    }

    /// Reset for a new candidate whose slots have `max[i]` variants.
    pub fn begin(&self, max: Vec<usize>) {
        let mut b = lock(&self.board);
        b.max = max;
        b.workers.clear();
        b.updates = 0;
    }

    /// Register a worker; returns its id.
    pub fn add(&self, name: impl Into<String>) -> usize {
        let mut b = lock(&self.board);
        b.workers.push(Some(WorkerProgress {
            name: name.into(),
            stack: Vec::new(),
        }));
        b.workers.len() - 1
    }

    /// Publish worker `id`'s current variant stack.
    pub fn set(&self, id: usize, stack: Vec<usize>) {
        let mut guard = lock(&self.board);
        let b = &mut *guard;
        if let Some(Some(w)) = b.workers.get_mut(id) {
            w.stack = stack;
            b.updates += 1;
        }
    }

    /// Deactivate worker `id`.
    pub fn remove(&self, id: usize) {
        if let Some(slot) = lock(&self.board).workers.get_mut(id) {
            *slot = None;
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        lock(&self.board).snapshot()
    }

    /// Stop the ticker thread and wait for it. Idempotent.
    pub fn stop(&self) {
        if let Some(tx) = lock(&self.stop).take() {
            let _ = tx.send(());
        }
        if let Some(handle) = lock(&self.ticker).take() {
            let _ = handle.join();
        }
    }
}

impl Default for ProgressMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
