//! src/fanin/mod.rs
//!
//! Fan-in of many producer endpoints into one sequence.
//!
//! - [`Collector`]: unordered merge; items are taken in arrival order from
//!   whichever source has one ready.
//! - [`Sorter`]: order-preserving k-way merge of sources that are each
//!   individually non-decreasing.
//!
//! Both come in two behaviorally equivalent readiness flavors: multiplexed
//! (a blocking multi-way wait over all active endpoints) and polling
//! (non-blocking scans separated by a fixed sleep — the only place this
//! crate exposes a latency/throughput knob).
//!
//! Per registered source, both components follow the same state machine:
//! REGISTERED → ACTIVE (items flowing) → RETIRED (end-of-stream observed),
//! with no way back.

mod collector;
mod readiness;
mod sorter;

pub use collector::Collector;
pub use sorter::Sorter;

pub(crate) use readiness::{poll_sources, Round, Strategy};
