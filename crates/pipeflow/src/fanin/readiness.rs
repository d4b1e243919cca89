//! src/fanin/readiness.rs
//!
//! The two readiness strategies shared by collector and sorter: a
//! multi-way blocking wait (`crossbeam_channel::Select`) and a
//! non-blocking poll scan.

use crossbeam_channel::Select;
use std::time::Duration;

use crate::channel::{Message, SentinelChannel};

/// How long one multiplexed wait blocks before the caller gets a chance to
/// re-read the (possibly mutated) active-source set.
pub(crate) const MULTIPLEX_WAIT: Duration = Duration::from_millis(100);

/// Readiness strategy for a fan-in component.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Strategy {
    /// Block on all active sources at once; wake when any becomes ready.
    Multiplex,
    /// Scan all active sources for availability; the caller sleeps this
    /// long when none is ready.
    Poll(Duration),
}

/// Outcome of one readiness round over the active-source set.
pub(crate) enum Round<T> {
    /// Source `usize` had a message ready.
    Ready(usize, Message<T>),
    /// No source was ready this round. Under `Strategy::Multiplex` the wait
    /// already blocked for [`MULTIPLEX_WAIT`]; under `Strategy::Poll` the
    /// caller is expected to sleep the configured interval.
    Idle,
}

/// Performs one readiness round. Never blocks longer than
/// [`MULTIPLEX_WAIT`], so the caller can keep the source set lock without
/// starving a concurrent attach for long.
pub(crate) fn poll_sources<T>(sources: &[SentinelChannel<T>], strategy: &Strategy) -> Round<T> {
    match strategy {
        Strategy::Multiplex => {
            let mut select = Select::new();
            for source in sources {
                select.recv(source.receiver());
            }
            match select.ready_timeout(MULTIPLEX_WAIT) {
                Ok(index) => match sources[index].receiver().try_recv() {
                    Ok(message) => Round::Ready(index, message),
                    // Lost the race against another reader of the same
                    // endpoint; treat as an idle round.
                    Err(_) => Round::Idle,
                },
                Err(_) => Round::Idle,
            }
        }
        Strategy::Poll(_) => {
            for (index, source) in sources.iter().enumerate() {
                if let Ok(message) = source.receiver().try_recv() {
                    return Round::Ready(index, message);
                }
            }
            Round::Idle
        }
    }
}
