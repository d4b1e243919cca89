//! src/feeder/thread.rs
//!
//! Thread-isolated feeder: drives a blocking generator on its own thread so
//! the consuming pipeline never waits inside the generator's system calls.

use anyhow::{Context, Result};
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use super::{panic_reason, Produce};
use crate::channel::{Drain, SentinelChannel};

/// Runs one generator to completion on a dedicated thread, forwarding each
/// produced value onto a sentinel channel.
///
/// Readers observe items in the exact order produced. Any number of readers
/// may consume the output concurrently (competitively); every reader
/// observes end-of-stream once the generator is exhausted.
///
/// A panic inside the generator is captured and forwarded as a failure item,
/// so downstream readers surface it as an `Err` instead of blocking forever.
///
/// There is no cancellation: dropping the feeder leaves the generator thread
/// running (or blocked, if the channel is bounded) until process exit.
pub struct ThreadFeeder<T> {
    output: SentinelChannel<T>,
    handle: thread::JoinHandle<()>,
}

impl<T: Send + 'static> ThreadFeeder<T> {
    /// Spawns the generator with an unbounded hand-off buffer.
    ///
    /// The generator is called exactly once, on the feeder thread, and its
    /// sequence is driven to completion there.
    pub fn spawn<G, I>(generator: G) -> Result<Self>
    where
        G: FnOnce() -> I + Send + 'static,
        I: IntoIterator<Item = T>,
    {
        Self::spawn_on(SentinelChannel::unbounded(), generator)
    }

    /// Spawns the generator with a bounded hand-off buffer of `capacity`
    /// items; the generator blocks once it runs that far ahead of consumers.
    /// Fails for a capacity of 0, which could never signal end-of-stream.
    pub fn spawn_bounded<G, I>(capacity: usize, generator: G) -> Result<Self>
    where
        G: FnOnce() -> I + Send + 'static,
        I: IntoIterator<Item = T>,
    {
        Self::spawn_on(SentinelChannel::bounded(capacity)?, generator)
    }

    fn spawn_on<G, I>(output: SentinelChannel<T>, generator: G) -> Result<Self>
    where
        G: FnOnce() -> I + Send + 'static,
        I: IntoIterator<Item = T>,
    {
        let channel = output.clone();
        let handle = thread::Builder::new()
            .name("feeder".to_string())
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    for item in generator() {
                        channel.put(item);
                    }
                }));
                if let Err(payload) = outcome {
                    channel.fail(panic_reason(payload.as_ref()));
                }
                channel.close();
            })
            .context("failed to spawn feeder thread")?;

        Ok(Self { output, handle })
    }

    /// Consuming view of the feeder's output; see
    /// [`SentinelChannel::iter`].
    pub fn iter(&self) -> Drain<T> {
        self.output.iter()
    }

    /// Whether the generator has run to completion (or failed).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl<T: Send + 'static> Produce<T> for ThreadFeeder<T> {
    fn output(&self) -> SentinelChannel<T> {
        self.output.clone()
    }
}
