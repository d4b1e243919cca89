//! src/pool/process.rs
//!
//! Process-isolated worker pool. A closure cannot cross the process
//! boundary, so here the transformation *is* the worker command: each child
//! reads one serialized item of `T` per stdin line and writes any number of
//! serialized `U` items, one per stdout line.
//!
//! Per worker, an in-process writer thread competitively drains the shared
//! input channel into the child's stdin, and a reader thread decodes the
//! child's stdout into the shared output channel. The cleanup thread joins
//! every writer and reader (and through the readers, reaps every child)
//! before emitting the single End on the output.

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{LineWriter, Write};
use std::process::{Command, Stdio};
use std::thread;

use super::spawn_feeder;
use crate::channel::{Drain, SentinelChannel};
use crate::feeder::{decode_lines, reap_child, Produce};

/// Pool of worker processes applying one command to a shared stream.
///
/// Items must be serializable to cross the process boundary; a value that
/// fails to serialize, an undecodable child output line, and a non-zero
/// child exit status all surface as failure items on the output channel.
pub struct ProcessPool<T, U> {
    input: SentinelChannel<T>,
    output: SentinelChannel<U>,
}

impl<T, U> ProcessPool<T, U>
where
    T: Serialize + Send + 'static,
    U: DeserializeOwned + Send + 'static,
{
    /// Spawns `poolsize` children of the command produced by `command`,
    /// plus their forwarding threads and the cleanup thread.
    ///
    /// The factory is called once per worker; every invocation should
    /// produce the same transformation for the pool's multiset contract to
    /// mean anything. `poolsize` of zero is rejected, as for
    /// [`ThreadPool`](crate::pool::ThreadPool).
    pub fn new<F>(mut command: F, poolsize: usize) -> Result<Self>
    where
        F: FnMut() -> Command,
    {
        if poolsize == 0 {
            bail!(
                "cannot create a process pool with 0 workers: \
                nothing would drain the input or terminate the output"
            );
        }

        let input: SentinelChannel<T> = SentinelChannel::unbounded();
        let output: SentinelChannel<U> = SentinelChannel::unbounded();

        let mut forwarders = Vec::with_capacity(poolsize * 2);
        for worker_id in 0..poolsize {
            let mut cmd = command();
            cmd.stdin(Stdio::piped()).stdout(Stdio::piped());
            let describe = format!("{:?}", cmd);
            let mut child = cmd.spawn().with_context(|| {
                format!("failed to spawn worker process {}: {}", worker_id, describe)
            })?;
            let stdin = child
                .stdin
                .take()
                .with_context(|| format!("worker process {} has no captured stdin", worker_id))?;
            let stdout = child
                .stdout
                .take()
                .with_context(|| format!("worker process {} has no captured stdout", worker_id))?;

            let feed = input.iter();
            let out = output.clone();
            let writer = thread::Builder::new()
                .name(format!("pool-stdin-{}", worker_id))
                .spawn(move || {
                    let mut stdin = LineWriter::new(stdin);
                    for item in feed {
                        match item {
                            Ok(value) => {
                                let line = match serde_json::to_string(&value) {
                                    Ok(line) => line,
                                    Err(error) => {
                                        out.fail(format!(
                                            "worker {}: unserializable item: {}",
                                            worker_id, error
                                        ));
                                        continue;
                                    }
                                };
                                if writeln!(stdin, "{}", line).is_err() {
                                    // Child is gone; its reader thread
                                    // reports the exit status.
                                    break;
                                }
                            }
                            // Relay an upstream failure straight past the
                            // child; it cannot cross the pipe.
                            Err(error) => out.fail(error.to_string()),
                        }
                    }
                    // Dropping stdin here sends EOF so the child can finish.
                })
                .with_context(|| format!("failed to spawn stdin thread for worker {}", worker_id))?;
            forwarders.push(writer);

            let out = output.clone();
            let reader = thread::Builder::new()
                .name(format!("pool-stdout-{}", worker_id))
                .spawn(move || {
                    let origin = format!("worker process {}", worker_id);
                    decode_lines(stdout, &out, &origin);
                    reap_child(child, &out, &origin);
                })
                .with_context(|| {
                    format!("failed to spawn stdout thread for worker {}", worker_id)
                })?;
            forwarders.push(reader);
        }

        let out = output.clone();
        thread::Builder::new()
            .name("pool-cleanup".to_string())
            .spawn(move || {
                for forwarder in forwarders {
                    let _ = forwarder.join();
                }
                out.close();
            })
            .context("failed to spawn pool cleanup thread")?;

        Ok(Self { input, output })
    }

    /// Connects the upstream source: a dedicated feeder thread performs one
    /// `put` per item followed by one End. Call this exactly once per pool.
    pub fn feed<I>(&self, source: I) -> Result<()>
    where
        I: IntoIterator<Item = T> + Send + 'static,
    {
        spawn_feeder(self.input.clone(), source)
    }

    /// Consuming view of the pool's output; see [`SentinelChannel::iter`].
    pub fn iter(&self) -> Drain<U> {
        self.output.iter()
    }
}

impl<T, U> Produce<U> for ProcessPool<T, U>
where
    T: Serialize + Send + 'static,
    U: DeserializeOwned + Send + 'static,
{
    fn output(&self) -> SentinelChannel<U> {
        self.output.clone()
    }
}
