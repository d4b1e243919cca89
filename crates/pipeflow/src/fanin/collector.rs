//! src/fanin/collector.rs
//!
//! Unordered fan-in: one lazy sequence interleaving the items of an
//! arbitrary, dynamically growing set of producer endpoints.

use anyhow::{anyhow, Result};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::{poll_sources, Round, Strategy};
use crate::channel::{Message, SentinelChannel};
use crate::feeder::Produce;

/// Collects items from any number of feeders or pools in arrival order.
///
/// The collector implements `Iterator` directly: each `next()` takes one
/// item from whichever active source has one ready, with no cross-source
/// ordering or determinism guarantee. A source is retired the moment its
/// end-of-stream marker is observed (the marker itself is never emitted);
/// the sequence ends when the active set becomes empty.
///
/// Sources may be attached at any time, including while the collector is
/// already producing — clone the collector to keep an attach handle while
/// another part of the code iterates. Clones share the active-source set
/// and consume competitively.
pub struct Collector<T> {
    sources: Arc<Mutex<Vec<SentinelChannel<T>>>>,
    strategy: Strategy,
}

impl<T> Clone for Collector<T> {
    fn clone(&self) -> Self {
        Self {
            sources: self.sources.clone(),
            strategy: self.strategy,
        }
    }
}

impl<T> Collector<T> {
    /// Readiness-multiplexed collector: blocks on all active sources
    /// simultaneously.
    pub fn new() -> Self {
        Self::with_strategy(Strategy::Multiplex)
    }

    /// Polling collector: scans all active sources and sleeps `interval`
    /// when none is ready.
    pub fn polling(interval: Duration) -> Self {
        Self::with_strategy(Strategy::Poll(interval))
    }

    fn with_strategy(strategy: Strategy) -> Self {
        Self {
            sources: Arc::new(Mutex::new(Vec::new())),
            strategy,
        }
    }

    /// Registers a producer's output endpoint with the active set.
    ///
    /// May briefly block while an in-flight readiness round holds the set.
    pub fn attach<P>(&self, producer: &P)
    where
        P: Produce<T> + ?Sized,
    {
        self.sources
            .lock()
            .expect("collector source set lock poisoned")
            .push(producer.output());
    }
}

impl<T> Default for Collector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Iterator for Collector<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut sources = self
                .sources
                .lock()
                .expect("collector source set lock poisoned");
            if sources.is_empty() {
                return None;
            }
            match poll_sources(&sources, &self.strategy) {
                Round::Ready(_, Message::Item(value)) => return Some(Ok(value)),
                Round::Ready(_, Message::Failed(reason)) => return Some(Err(anyhow!(reason))),
                Round::Ready(index, Message::End) => {
                    // Retired exactly once; the marker is not forwarded.
                    sources.remove(index);
                }
                Round::Idle => {
                    drop(sources);
                    if let Strategy::Poll(interval) = self.strategy {
                        thread::sleep(interval);
                    }
                }
            }
        }
    }
}
