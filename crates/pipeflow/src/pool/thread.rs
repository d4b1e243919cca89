//! src/pool/thread.rs
//!
//! Thread-isolated worker pool: each worker runs one independent instance of
//! the same iterator-to-iterator transformation against the shared input
//! channel.

use anyhow::{bail, Context, Result};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use super::spawn_feeder;
use crate::channel::{Drain, SentinelChannel};
use crate::feeder::{panic_reason, Produce};

/// Pool of worker threads applying one transformation to a shared stream.
///
/// The transformation maps a lazy sequence of `T` to a lazy sequence of `U`
/// and is invoked exactly once per worker, each against an independent
/// [`Drain`] of the shared input channel. Upstream failures appear as `Err`
/// items in that drain; a transform that only cares about values can
/// `flatten()` them away, at the cost of swallowing the failure.
///
/// A worker panic is captured and forwarded as a failure item on the output
/// channel; the remaining workers keep draining the input, and the pool's
/// output still terminates.
pub struct ThreadPool<T, U> {
    input: SentinelChannel<T>,
    output: SentinelChannel<U>,
}

impl<T, U> ThreadPool<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    /// Spawns `poolsize` workers plus the cleanup thread that joins them
    /// all and then emits the single End on the output channel.
    ///
    /// `poolsize` of zero is rejected: no worker would ever drain the input
    /// or terminate the output, and the pool would hang silently.
    pub fn new<F, I>(transform: F, poolsize: usize) -> Result<Self>
    where
        F: Fn(Drain<T>) -> I + Send + Sync + 'static,
        I: IntoIterator<Item = U>,
    {
        if poolsize == 0 {
            bail!(
                "cannot create a worker pool with 0 workers: \
                nothing would drain the input or terminate the output"
            );
        }
        if let Ok(parallelism) = thread::available_parallelism() {
            if poolsize > parallelism.get() {
                eprintln!(
                    "[ThreadPool] warning: {} workers on {} available cores, \
                    workers will contend for CPU",
                    poolsize,
                    parallelism.get()
                );
            }
        }

        let input = SentinelChannel::unbounded();
        let output = SentinelChannel::unbounded();
        let transform = Arc::new(transform);

        let mut workers = Vec::with_capacity(poolsize);
        for worker_id in 0..poolsize {
            let feed = input.iter();
            let out = output.clone();
            let transform = transform.clone();
            let handle = thread::Builder::new()
                .name(format!("pool-worker-{}", worker_id))
                .spawn(move || {
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                        for item in (*transform)(feed) {
                            out.put(item);
                        }
                    }));
                    if let Err(payload) = outcome {
                        out.fail(format!(
                            "pool worker {} panicked: {}",
                            worker_id,
                            panic_reason(payload.as_ref())
                        ));
                    }
                })
                .with_context(|| format!("failed to spawn pool worker thread {}", worker_id))?;
            workers.push(handle);
        }

        let out = output.clone();
        thread::Builder::new()
            .name("pool-cleanup".to_string())
            .spawn(move || {
                // Panicked workers already reported themselves; all that
                // matters here is that every worker has terminated before
                // the single End goes out.
                for worker in workers {
                    let _ = worker.join();
                }
                out.close();
            })
            .context("failed to spawn pool cleanup thread")?;

        Ok(Self { input, output })
    }

    /// Like [`new`](Self::new) with `poolsize` taken from the machine's
    /// available parallelism.
    pub fn with_default_size<F, I>(transform: F) -> Result<Self>
    where
        F: Fn(Drain<T>) -> I + Send + Sync + 'static,
        I: IntoIterator<Item = U>,
    {
        let poolsize = thread::available_parallelism().map_or(1, |n| n.get());
        Self::new(transform, poolsize)
    }

    /// Connects the upstream source: a dedicated feeder thread performs one
    /// `put` per item followed by one End. Call this exactly once per pool.
    pub fn feed<I>(&self, source: I) -> Result<()>
    where
        I: IntoIterator<Item = T> + Send + 'static,
    {
        spawn_feeder(self.input.clone(), source)
    }

    /// Consuming view of the pool's output; see [`SentinelChannel::iter`].
    pub fn iter(&self) -> Drain<U> {
        self.output.iter()
    }
}

impl<T, U> Produce<U> for ThreadPool<T, U>
where
    T: Send + 'static,
    U: Send + 'static,
{
    fn output(&self) -> SentinelChannel<U> {
        self.output.clone()
    }
}
