//! Feeder and sentinel channel behavior.
//!
//! Covers:
//! - Production order and single end-of-stream observation
//! - End rebroadcast to concurrent sibling consumers
//! - Idempotence of an exhausted output
//! - Captured generator panics surfacing as errors
//! - Bounded hand-off backpressure

use anyhow::Result;
use pipeflow::{Message, SentinelChannel, ThreadFeeder};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn feeder_preserves_generator_order() -> Result<()> {
    let feeder = ThreadFeeder::spawn(|| vec![3, 1, 4, 1, 5])?;
    let values: Vec<i32> = feeder.iter().collect::<Result<_>>()?;
    assert_eq!(values, vec![3, 1, 4, 1, 5]);
    Ok(())
}

#[test]
fn exhausted_feeder_yields_empty_without_rerunning() -> Result<()> {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let feeder = ThreadFeeder::spawn(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        vec![1, 2]
    })?;

    assert_eq!(feeder.iter().count(), 2);
    // A second drain observes the rebroadcast marker immediately.
    assert_eq!(feeder.iter().count(), 0);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn feeder_reports_completion_after_drain() -> Result<()> {
    let feeder = ThreadFeeder::spawn(|| vec![1, 2, 3])?;
    assert_eq!(feeder.iter().count(), 3);

    // The generator thread exits shortly after pushing the marker the drain
    // just observed.
    let deadline = Instant::now() + Duration::from_secs(5);
    while !feeder.is_finished() {
        assert!(Instant::now() < deadline, "feeder thread never finished");
        thread::sleep(Duration::from_millis(1));
    }
    Ok(())
}

#[test]
fn channel_get_observes_items_then_end() {
    let channel = SentinelChannel::unbounded();
    channel.put(7);
    channel.close();
    assert!(matches!(channel.get(), Message::Item(7)));
    assert!(matches!(channel.get(), Message::End));
}

#[test]
fn end_is_rebroadcast_to_concurrent_consumers() -> Result<()> {
    let feeder = ThreadFeeder::spawn(|| 0..100)?;
    let left = feeder.iter();
    let right = feeder.iter();

    // Both loops must terminate; neither may block forever waiting for a
    // marker the other consumed.
    let left = thread::spawn(move || left.count());
    let right = thread::spawn(move || right.count());
    let total = left.join().unwrap() + right.join().unwrap();

    assert_eq!(total, 100, "items were either lost or seen twice");
    Ok(())
}

#[test]
fn generator_panic_surfaces_as_error() -> Result<()> {
    let feeder = ThreadFeeder::spawn(|| {
        (0..5).map(|i| {
            if i == 3 {
                panic!("bad item");
            }
            i
        })
    })?;

    let mut values = Vec::new();
    let mut failure = None;
    for item in feeder.iter() {
        match item {
            Ok(value) => values.push(value),
            Err(error) => failure = Some(error),
        }
    }

    assert_eq!(values, vec![0, 1, 2]);
    let failure = failure.expect("the panic should surface as an Err item");
    assert!(failure.to_string().contains("bad item"));
    Ok(())
}

#[test]
fn bounded_feeder_applies_backpressure() -> Result<()> {
    let produced = Arc::new(AtomicUsize::new(0));
    let counter = produced.clone();
    let feeder = ThreadFeeder::spawn_bounded(2, move || {
        (0..100).map(move |i| {
            counter.fetch_add(1, Ordering::SeqCst);
            i
        })
    })?;

    // With nobody consuming, the generator can run at most capacity plus
    // one in-flight item ahead.
    thread::sleep(Duration::from_millis(100));
    assert!(produced.load(Ordering::SeqCst) <= 4);

    let values: Vec<i32> = feeder.iter().collect::<Result<_>>()?;
    assert_eq!(values.len(), 100);
    assert_eq!(produced.load(Ordering::SeqCst), 100);
    Ok(())
}

#[test]
fn zero_capacity_feeder_is_rejected() {
    let result = ThreadFeeder::spawn_bounded(0, || std::iter::empty::<i32>());
    assert!(result.is_err());
}
