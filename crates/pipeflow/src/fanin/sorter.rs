//! src/fanin/sorter.rs
//!
//! Order-preserving fan-in: a k-way ascending merge over sources that are
//! each individually non-decreasing.
//!
//! The merge step must be able to block on any one source's head without
//! holding back the others, so raw sources are not merged directly.
//! Instead a re-distribution thread drains every raw endpoint (using the
//! same readiness strategies as the collector) into one private staging
//! channel per source, preserving per-source order; the merge thread then
//! works over the staging channels' blocking iterator views, where a slow
//! source stalls only the moment its head is actually the next candidate.

use anyhow::{bail, Context, Result};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::{poll_sources, Round, Strategy};
use crate::channel::{Drain, Message, SentinelChannel};
use crate::feeder::Produce;

/// Merges many individually-sorted producer streams into one globally
/// non-decreasing sequence.
///
/// Precondition, on the caller and not validated: each attached source,
/// taken alone, is non-decreasing under `T`'s total order. A source that
/// violates this produces silently unsorted output.
///
/// Sources are registered with [`attach`](Self::attach) and frozen by
/// [`run`](Self::run) (or the first [`iter`](Self::iter)); attaching after
/// the merge has started fails immediately. Ties between sources break
/// arbitrarily. Output ends when every staging channel is drained and
/// retired.
pub struct Sorter<T> {
    pending: Arc<Mutex<Vec<SentinelChannel<T>>>>,
    started: Arc<AtomicBool>,
    strategy: Strategy,
    output: SentinelChannel<T>,
}

impl<T> Sorter<T>
where
    T: Ord + Send + 'static,
{
    /// Readiness-multiplexed sorter.
    pub fn new() -> Self {
        Self::with_strategy(Strategy::Multiplex)
    }

    /// Polling sorter; the re-distribution thread sleeps `interval` when no
    /// raw source is ready.
    pub fn polling(interval: Duration) -> Self {
        Self::with_strategy(Strategy::Poll(interval))
    }

    fn with_strategy(strategy: Strategy) -> Self {
        Self {
            pending: Arc::new(Mutex::new(Vec::new())),
            started: Arc::new(AtomicBool::new(false)),
            strategy,
            output: SentinelChannel::unbounded(),
        }
    }

    /// Registers a producer's output endpoint. Fails once the merge has
    /// started: the staging layout is fixed at [`run`](Self::run).
    pub fn attach<P>(&self, producer: &P) -> Result<()>
    where
        P: Produce<T> + ?Sized,
    {
        if self.started.load(Ordering::SeqCst) {
            bail!("cannot attach a source after the sorter has started merging");
        }
        self.pending
            .lock()
            .expect("sorter source set lock poisoned")
            .push(producer.output());
        Ok(())
    }

    /// Freezes the source set and spawns the re-distribution and merge
    /// threads. Idempotent; called implicitly by [`iter`](Self::iter).
    pub fn run(&self) -> Result<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let sources: Vec<SentinelChannel<T>> = self
            .pending
            .lock()
            .expect("sorter source set lock poisoned")
            .drain(..)
            .collect();
        let staging: Vec<SentinelChannel<T>> =
            (0..sources.len()).map(|_| SentinelChannel::unbounded()).collect();

        {
            let staging = staging.clone();
            let strategy = self.strategy;
            thread::Builder::new()
                .name("sorter-collect".to_string())
                .spawn(move || redistribute(sources, staging, strategy))
                .context("failed to spawn sorter re-distribution thread")?;
        }

        let drains: Vec<Drain<T>> = staging.iter().map(SentinelChannel::iter).collect();
        let output = self.output.clone();
        thread::Builder::new()
            .name("sorter-merge".to_string())
            .spawn(move || {
                merge_into(drains, &output);
                output.close();
            })
            .context("failed to spawn sorter merge thread")?;

        Ok(())
    }

    /// Consuming view of the merged output, starting the merge on first
    /// use; see [`SentinelChannel::iter`].
    pub fn iter(&self) -> Result<Drain<T>> {
        self.run()?;
        Ok(self.output.iter())
    }
}

impl<T> Default for Sorter<T>
where
    T: Ord + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

/// The merged output doubles as a producer endpoint, so a sorter can feed a
/// collector or another fan-in stage. Call [`run`](Self::run) before the
/// downstream stage consumes: the endpoint of an un-run sorter never carries
/// the end-of-stream marker.
impl<T> Produce<T> for Sorter<T>
where
    T: Ord + Send + 'static,
{
    fn output(&self) -> SentinelChannel<T> {
        self.output.clone()
    }
}

/// Drains every raw source into its staging channel, preserving per-source
/// order. End retires the raw source and closes its staging channel;
/// failures are forwarded into the staging channel so the merge re-raises
/// them downstream.
fn redistribute<T: Send>(
    sources: Vec<SentinelChannel<T>>,
    staging: Vec<SentinelChannel<T>>,
    strategy: Strategy,
) {
    let mut active = sources;
    // Indices into `staging` for the still-active raw sources; kept in
    // lockstep with `active` as retired sources are removed.
    let mut queue_of: Vec<usize> = (0..active.len()).collect();

    while !active.is_empty() {
        match poll_sources(&active, &strategy) {
            Round::Ready(index, Message::Item(value)) => staging[queue_of[index]].put(value),
            Round::Ready(index, Message::Failed(reason)) => staging[queue_of[index]].fail(reason),
            Round::Ready(index, Message::End) => {
                staging[queue_of[index]].close();
                active.remove(index);
                queue_of.remove(index);
            }
            Round::Idle => {
                if let Strategy::Poll(interval) = strategy {
                    thread::sleep(interval);
                }
            }
        }
    }
}

/// K-way ascending merge: repeatedly emit the minimum head across all
/// non-retired staging drains. Blocking on one drain's head is the intended
/// behavior; the other sources keep filling their staging channels in the
/// meantime.
fn merge_into<T: Ord>(mut sources: Vec<Drain<T>>, output: &SentinelChannel<T>) {
    let mut heads: BinaryHeap<Reverse<(T, usize)>> = BinaryHeap::with_capacity(sources.len());
    for index in 0..sources.len() {
        if let Some(value) = next_value(&mut sources[index], output) {
            heads.push(Reverse((value, index)));
        }
    }
    while let Some(Reverse((value, index))) = heads.pop() {
        output.put(value);
        if let Some(value) = next_value(&mut sources[index], output) {
            heads.push(Reverse((value, index)));
        }
    }
}

/// Next orderable value from one staging drain; forwarded failures are
/// re-emitted downstream out of band of the ordering.
fn next_value<T>(source: &mut Drain<T>, output: &SentinelChannel<T>) -> Option<T> {
    for item in source {
        match item {
            Ok(value) => return Some(value),
            Err(error) => output.fail(error.to_string()),
        }
    }
    None
}
