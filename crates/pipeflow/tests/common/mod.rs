//! Shared helpers for the integration tests.
#![allow(dead_code)]

use std::process::Command;

/// Builds a `/bin/sh -c` command for the process-isolation tests.
pub fn sh(script: &str) -> Command {
    let mut command = Command::new("sh");
    command.arg("-c").arg(script);
    command
}

/// Sorts a collected multiset so tests can compare order-free output.
pub fn sorted<T: Ord>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut values: Vec<T> = values.into_iter().collect();
    values.sort();
    values
}
