//! Concurrent fan-out/fan-in building blocks for lazy pipelines.
//!
//! A potentially slow, blocking producer runs in an isolated execution
//! context — a thread or a child process — while downstream consumers pull
//! its output through an ordinary `Iterator`. Several isolated producers can
//! then be combined: merged without order, merged with order preserved, or
//! processed by a pool of parallel workers applying one transformation.
//!
//! # Architecture Overview
//!
//! ```text
//!   generator ──▶ [ThreadFeeder / ProcessFeeder] ──▶ SentinelChannel ─┐
//!   generator ──▶ [ThreadFeeder / ProcessFeeder] ──▶ SentinelChannel ─┤
//!                                                                     ├──▶ Collector (arrival order)
//!   upstream ───▶ [ThreadPool / ProcessPool] ──────▶ SentinelChannel ─┤
//!                  N workers, shared in/out                           └──▶ Sorter (k-way merge)
//! ```
//!
//! Every hand-off goes through a [`SentinelChannel`]: an ordered buffer
//! carrying payload items, forwarded producer failures, and a tagged
//! end-of-stream marker that is rebroadcast to however many consumers are
//! blocked on the channel. Failures are re-raised as `Err` items exactly
//! where the consumer pulls past them, never swallowed.
//!
//! # Ordering guarantees
//!
//! - Feeders preserve producer order exactly.
//! - Pools preserve the multiset only: workers drain the shared input
//!   competitively, so output order is unconstrained.
//! - The [`Collector`] emits in arrival order across sources.
//! - The [`Sorter`] emits globally non-decreasing output, provided every
//!   source was individually non-decreasing (a caller obligation).
//!
//! # Example
//!
//! ```
//! use pipeflow::{Drain, ThreadFeeder, ThreadPool};
//!
//! # fn main() -> anyhow::Result<()> {
//! // A blocking generator, isolated on its own thread.
//! let feeder = ThreadFeeder::spawn(|| 0..5)?;
//! let values: Vec<i32> = feeder.iter().collect::<anyhow::Result<_>>()?;
//! assert_eq!(values, vec![0, 1, 2, 3, 4]);
//!
//! // Two workers applying one transformation to a shared stream.
//! let pool = ThreadPool::new(|input: Drain<i64>| input.flatten().map(|x| x * x), 2)?;
//! pool.feed(0..10)?;
//! let mut squares: Vec<i64> = pool.iter().collect::<anyhow::Result<_>>()?;
//! squares.sort();
//! assert_eq!(squares, vec![0, 1, 4, 9, 16, 25, 36, 49, 64, 81]);
//! # Ok(())
//! # }
//! ```
//!
//! # What this crate does not do
//!
//! No distributed execution, no restart of a failed execution context, no
//! flow control beyond bounded/unbounded channel buffers, and no
//! cancellation: a consumer that simply stops pulling leaves spawned
//! contexts running (or blocked) until process exit.

pub mod channel;
pub mod fanin;
pub mod feeder;
pub mod generate;
pub mod pool;

pub use channel::{Drain, Message, SentinelChannel};
pub use fanin::{Collector, Sorter};
pub use feeder::{ProcessFeeder, Produce, ThreadFeeder};
pub use pool::{ProcessPool, ThreadPool};
