//! src/feeder/mod.rs
//!
//! Feeders run a single generator to completion inside an isolated
//! execution context and expose its output as a sequence.
//!
//! Two flavors differ only in the isolation mechanism:
//! - [`ThreadFeeder`]: the generator runs on a dedicated in-process thread.
//! - [`ProcessFeeder`]: the generator is an external command; items cross a
//!   serialization boundary as one JSON value per stdout line.
//!
//! Either way the feeder pushes every produced value onto a sentinel
//! channel in production order, forwards a captured failure as
//! [`Message::Failed`](crate::channel::Message), and finally pushes the
//! end-of-stream marker.

mod process;
mod thread;

pub use process::ProcessFeeder;
pub use thread::ThreadFeeder;

pub(crate) use process::{decode_lines, reap_child};

use crate::channel::SentinelChannel;
use std::any::Any;

/// The attach protocol: anything that exposes its output as a sentinel
/// channel endpoint can be registered with a
/// [`Collector`](crate::fanin::Collector) or [`Sorter`](crate::fanin::Sorter).
///
/// Endpoints are cheap clones; handing one out does not disturb other
/// readers beyond the usual competitive consumption.
pub trait Produce<T> {
    fn output(&self) -> SentinelChannel<T>;
}

/// Best-effort text of a panic payload, for forwarding a producer panic
/// down a channel as `Message::Failed`.
pub(crate) fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "producer panicked".to_string()
    }
}
