use crate::error::{MiningError, Result};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::sync::mpsc::{self, Receiver};
use tracing::{debug, error};

/// Completion handle for a task submitted to a [`WorkerPool`].
pub trait TaskHandle {
    /// Blocks until the task has finished.
    fn wait(self) -> Result<()>;
}

/// Fixed set of worker threads accepting fire-and-wait tasks.
pub trait WorkerPool {
    type Handle: TaskHandle;

    fn submit<F>(&self, task: F) -> Self::Handle
    where
        F: FnOnce() + Send + 'static;

    fn worker_count(&self) -> usize;
}

/// [`WorkerPool`] backed by a dedicated rayon thread pool.
pub struct RayonPool {
    pool: ThreadPool,
}

impl RayonPool {
    pub fn new(worker_count: usize) -> Result<Self> {
        let workers = worker_count.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("ledger-miner-{i}"))
            .panic_handler(|payload| {
                error!(reason = panic_message(&*payload), "mining task panicked");
            })
            .build()?;
        debug!(workers, "worker pool started");
        Ok(Self { pool })
    }
}

impl WorkerPool for RayonPool {
    type Handle = RayonHandle;

    fn submit<F>(&self, task: F) -> RayonHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let (done, rx) = mpsc::sync_channel(1);
        self.pool.spawn(move || {
            task();
            // the receiver may already be gone if the submitter gave up
            let _ = done.send(());
        });
        RayonHandle { done: rx }
    }

    fn worker_count(&self) -> usize {
        self.pool.current_num_threads()
    }
}

pub struct RayonHandle {
    done: Receiver<()>,
}

impl TaskHandle for RayonHandle {
    fn wait(self) -> Result<()> {
        // a panicking task drops its sender without signalling
        self.done.recv().map_err(|_| MiningError::WorkerLost)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
