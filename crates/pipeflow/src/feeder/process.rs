//! src/feeder/process.rs
//!
//! Process-isolated feeder: the generator is an external command running in
//! its own address space. Items cross the serialization boundary as one
//! JSON value per line on the child's stdout.
//!
//! Transport failures (an undecodable line, a broken pipe, a non-zero exit
//! status) are forwarded as failure items rather than raised out of band,
//! so they surface exactly where the consumer pulls past them.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::thread;

use super::Produce;
use crate::channel::{Drain, SentinelChannel};

/// Runs one producer command in a child process, forwarding each decoded
/// stdout line onto a sentinel channel.
///
/// The command's stdout is captured; anything it writes must be one
/// serde_json-decodable value of `T` per line (blank lines are skipped).
/// Spawn failures are reported synchronously from [`spawn`](Self::spawn);
/// everything after that is reported in-band through the channel.
pub struct ProcessFeeder<T> {
    output: SentinelChannel<T>,
}

impl<T: DeserializeOwned + Send + 'static> ProcessFeeder<T> {
    /// Spawns `command` with a piped stdout and starts forwarding its
    /// output. Decoding stops at the first undecodable line; the child is
    /// still reaped and its exit status checked.
    pub fn spawn(mut command: Command) -> Result<Self> {
        command.stdout(Stdio::piped());
        let describe = format!("{:?}", command);
        let mut child = command
            .spawn()
            .with_context(|| format!("failed to spawn producer process {}", describe))?;
        let stdout = child
            .stdout
            .take()
            .context("producer process has no captured stdout")?;

        let output = SentinelChannel::unbounded();
        let channel = output.clone();
        thread::Builder::new()
            .name("process-feeder".to_string())
            .spawn(move || {
                decode_lines(stdout, &channel, "producer process");
                reap_child(child, &channel, "producer process");
                channel.close();
            })
            .context("failed to spawn process feeder reader thread")?;

        Ok(Self { output })
    }

    /// Consuming view of the feeder's output; see
    /// [`SentinelChannel::iter`].
    pub fn iter(&self) -> Drain<T> {
        self.output.iter()
    }
}

impl<T: DeserializeOwned + Send + 'static> Produce<T> for ProcessFeeder<T> {
    fn output(&self) -> SentinelChannel<T> {
        self.output.clone()
    }
}

/// Decodes JSON lines from a child's pipe into `channel` until EOF or the
/// first transport failure. The reader is dropped on return, which closes
/// our end of the pipe and lets a still-writing child terminate.
pub(crate) fn decode_lines<T, R>(pipe: R, channel: &SentinelChannel<T>, origin: &str)
where
    T: DeserializeOwned,
    R: Read,
{
    let reader = BufReader::new(pipe);
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                channel.fail(format!("{}: broken pipe: {}", origin, error));
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(&line) {
            Ok(value) => channel.put(value),
            Err(error) => {
                channel.fail(format!(
                    "{}: undecodable item {:?}: {}",
                    origin, line, error
                ));
                return;
            }
        }
    }
}

/// Waits for a child and forwards an abnormal exit as a failure item.
pub(crate) fn reap_child<T>(mut child: Child, channel: &SentinelChannel<T>, origin: &str) {
    match child.wait() {
        Ok(status) if !status.success() => {
            channel.fail(format!("{} exited with {}", origin, status));
        }
        Err(error) => {
            channel.fail(format!("failed to reap {}: {}", origin, error));
        }
        Ok(_) => {}
    }
}
