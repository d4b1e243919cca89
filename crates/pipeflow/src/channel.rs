//! src/channel.rs
//!
//! The sentinel channel: the hand-off primitive underneath every feeder,
//! pool, collector and sorter in this crate.
//!
//! A `SentinelChannel<T>` carries `Message<T>` values between one producing
//! execution context and one or more consuming contexts. End-of-stream is a
//! tagged variant (`Message::End`), never an in-band payload value, so any
//! `T` can flow through the channel without colliding with the marker.
//!
//! # End rebroadcast
//!
//! Several consumer loops may be blocked on the same channel at once (pool
//! workers all draining one shared input, sibling readers of one feeder).
//! The producer only pushes a single `End`, so a consumer that reads it must
//! put it back before stopping; the next blocked consumer then observes it
//! and rebroadcasts in turn. `Drain` implements this; anyone calling `get()`
//! by hand and sharing the channel has to do the same.

use anyhow::{anyhow, ensure, Result};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::iter::FusedIterator;

/// A single hand-off on a [`SentinelChannel`].
#[derive(Debug)]
pub enum Message<T> {
    /// An ordinary payload item.
    Item(T),
    /// A captured producer failure, re-raised when a consumer pulls past it.
    Failed(String),
    /// End-of-stream marker. Exactly one is produced per writer; consumers
    /// rebroadcast it (see module docs).
    End,
}

/// Ordered hand-off buffer of `Message<T>`, safe for one writer and
/// one-or-more readers.
///
/// The channel owns both halves of the underlying crossbeam channel, so a
/// `put` can never observe disconnection: termination is always signalled
/// in-band by [`Message::End`], never by a closed endpoint.
pub struct SentinelChannel<T> {
    tx: Sender<Message<T>>,
    rx: Receiver<Message<T>>,
}

// Manual impl: cloning an endpoint must not require `T: Clone`.
impl<T> Clone for SentinelChannel<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            rx: self.rx.clone(),
        }
    }
}

impl<T> SentinelChannel<T> {
    /// Creates a channel with an unbounded hand-off buffer.
    pub fn unbounded() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Creates a channel whose buffer holds at most `capacity` messages;
    /// `put` blocks while the buffer is full.
    ///
    /// Fails if `capacity` is 0: a zero-capacity rendezvous channel would
    /// deadlock the End rebroadcast when no sibling reader is left.
    pub fn bounded(capacity: usize) -> Result<Self> {
        ensure!(capacity > 0, "sentinel channel capacity must be at least 1");
        let (tx, rx) = bounded(capacity);
        Ok(Self { tx, rx })
    }

    /// Pushes one payload item. Never fails; blocks while a bounded buffer
    /// is full.
    pub fn put(&self, value: T) {
        let _ = self.tx.send(Message::Item(value));
    }

    /// Pushes a captured producer failure.
    pub fn fail(&self, reason: String) {
        let _ = self.tx.send(Message::Failed(reason));
    }

    /// Pushes the end-of-stream marker.
    pub fn close(&self) {
        let _ = self.tx.send(Message::End);
    }

    /// Blocks until the next message is available.
    pub fn get(&self) -> Message<T> {
        self.rx.recv().unwrap_or(Message::End)
    }

    /// Returns a finite, non-restartable consuming view of the channel.
    ///
    /// Every call hands out an independent `Drain`; concurrent drains of the
    /// same channel consume competitively, and each of them terminates once
    /// the producer is done (End rebroadcast).
    pub fn iter(&self) -> Drain<T> {
        Drain {
            channel: self.clone(),
            done: false,
        }
    }

    pub(crate) fn receiver(&self) -> &Receiver<Message<T>> {
        &self.rx
    }
}

/// Consuming iterator over a [`SentinelChannel`].
///
/// Yields `Ok` for payload items and `Err` for forwarded producer failures,
/// and stops at the end-of-stream marker after putting it back for sibling
/// consumers. Once exhausted it stays exhausted: a fresh `Drain` of the same
/// finished channel immediately observes the rebroadcast marker and yields
/// nothing, without re-running any producer.
pub struct Drain<T> {
    channel: SentinelChannel<T>,
    done: bool,
}

impl<T> Iterator for Drain<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.channel.get() {
            Message::Item(value) => Some(Ok(value)),
            Message::Failed(reason) => Some(Err(anyhow!(reason))),
            Message::End => {
                // Rebroadcast so a sibling blocked on the same channel also
                // observes termination.
                self.channel.close();
                self.done = true;
                None
            }
        }
    }
}

impl<T> FusedIterator for Drain<T> {}
