//! Thread worker pool behavior.
//!
//! Covers:
//! - Multiset preservation under competitive consumption
//! - Rejection of zero-sized pools
//! - Order preservation in the degenerate single-worker case
//! - Worker panic reporting and pool termination
//! - Default pool sizing

mod common;

use anyhow::Result;
use common::sorted;
use pipeflow::{Drain, ThreadPool};

#[test]
fn pool_preserves_multiset_under_transform() -> Result<()> {
    let pool = ThreadPool::new(|input: Drain<i64>| input.flatten().map(|x| x * x), 2)?;
    pool.feed(0..10)?;

    let values = sorted(pool.iter().collect::<Result<Vec<i64>>>()?);
    assert_eq!(values, vec![0, 1, 4, 9, 16, 25, 36, 49, 64, 81]);
    Ok(())
}

#[test]
fn zero_worker_pool_is_rejected() {
    let result = ThreadPool::<i64, i64>::new(|input| input.flatten(), 0);
    assert!(result.is_err(), "a 0-worker pool must fail at construction, not hang");
}

#[test]
fn single_worker_pool_preserves_order() -> Result<()> {
    let pool = ThreadPool::new(|input: Drain<i64>| input.flatten().map(|x| x + 1), 1)?;
    pool.feed(0..5)?;

    let values: Vec<i64> = pool.iter().collect::<Result<_>>()?;
    assert_eq!(values, vec![1, 2, 3, 4, 5]);
    Ok(())
}

#[test]
fn exhausted_pool_output_stays_exhausted() -> Result<()> {
    let pool = ThreadPool::new(|input: Drain<i32>| input.flatten(), 3)?;
    pool.feed(0..20)?;

    assert_eq!(pool.iter().count(), 20);
    assert_eq!(pool.iter().count(), 0);
    Ok(())
}

#[test]
fn worker_panic_is_reported_and_pool_terminates() -> Result<()> {
    let pool = ThreadPool::new(
        |input: Drain<i64>| {
            input.flatten().map(|x| {
                if x == 3 {
                    panic!("poison value");
                }
                x
            })
        },
        2,
    )?;
    pool.feed(0..6)?;

    let mut values = Vec::new();
    let mut failures = Vec::new();
    for item in pool.iter() {
        match item {
            Ok(value) => values.push(value),
            Err(error) => failures.push(error),
        }
    }

    assert_eq!(failures.len(), 1);
    assert!(failures[0].to_string().contains("poison value"));
    // Only the poison item is lost; the surviving worker drains the rest.
    assert_eq!(sorted(values), vec![0, 1, 2, 4, 5]);
    Ok(())
}

#[test]
fn default_pool_size_runs_to_completion() -> Result<()> {
    let pool = ThreadPool::with_default_size(|input: Drain<u32>| input.flatten())?;
    pool.feed(0..50u32)?;

    let values = sorted(pool.iter().collect::<Result<Vec<u32>>>()?);
    assert_eq!(values, (0..50).collect::<Vec<u32>>());
    Ok(())
}

#[test]
fn oversubscribed_pool_still_completes() -> Result<()> {
    // More workers than cores only costs contention (and a warning).
    let pool = ThreadPool::new(|input: Drain<u32>| input.flatten(), 64)?;
    pool.feed(0..200u32)?;

    let values = sorted(pool.iter().collect::<Result<Vec<u32>>>()?);
    assert_eq!(values, (0..200).collect::<Vec<u32>>());
    Ok(())
}

#[test]
fn transform_may_emit_more_items_than_it_consumes() -> Result<()> {
    let pool = ThreadPool::new(
        |input: Drain<i64>| input.flatten().flat_map(|x| [x, -x]),
        2,
    )?;
    pool.feed(1..4)?;

    let values = sorted(pool.iter().collect::<Result<Vec<i64>>>()?);
    assert_eq!(values, vec![-3, -2, -1, 1, 2, 3]);
    Ok(())
}
