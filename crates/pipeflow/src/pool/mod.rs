//! src/pool/mod.rs
//!
//! Worker pools: N isolated execution contexts competitively consuming one
//! shared input channel and writing one shared output channel.
//!
//! ```text
//!   upstream source
//!        │  (feeder thread: one put per item, then End)
//!        ↓
//!   input SentinelChannel  ←── drained competitively
//!    │        │       │
//!  worker   worker  worker     (thread or child process, N of them)
//!    │        │       │
//!    └────────┴───────┘
//!        ↓
//!   output SentinelChannel  ←── exactly one End, emitted by the cleanup
//!                                thread after every worker has terminated
//! ```
//!
//! Because the input channel is shared, only one worker would naturally see
//! the raw end-of-stream marker; the channel's End rebroadcast (see
//! [`crate::channel`]) guarantees every worker's pull loop terminates.
//!
//! Pools preserve the input multiset (modulo the transformation) but not its
//! order: there is no guarantee which worker consumes which item.

mod process;
mod thread;

pub use process::ProcessPool;
pub use thread::ThreadPool;

use anyhow::{Context, Result};
use std::panic::{self, AssertUnwindSafe};
use std::thread as std_thread;

use crate::channel::SentinelChannel;
use crate::feeder::panic_reason;

/// Spawns the dedicated feeder thread that drains an upstream source into a
/// pool's shared input channel: one `put` per item, then a single End.
///
/// A panic while driving the source is forwarded to the input channel so
/// every worker (and through them, the pool consumer) sees the failure
/// instead of blocking forever.
pub(crate) fn spawn_feeder<T, I>(input: SentinelChannel<T>, source: I) -> Result<()>
where
    T: Send + 'static,
    I: IntoIterator<Item = T> + Send + 'static,
{
    std_thread::Builder::new()
        .name("pool-feeder".to_string())
        .spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                for item in source {
                    input.put(item);
                }
            }));
            if let Err(payload) = outcome {
                input.fail(panic_reason(payload.as_ref()));
            }
            input.close();
        })
        .context("failed to spawn pool feeder thread")?;
    Ok(())
}
