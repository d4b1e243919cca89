//! src/generate.rs
//!
//! Small generator toolkit: infinite sources commonly handed to a feeder.
//! Anything `IntoIterator` works as a generator; these are just the
//! recurring shapes.

use std::ops::{Add, Mul};

/// Arithmetic sequence `start, start + step, start + 2 * step, ...`.
/// Works with any type with `+` defined.
///
/// ```
/// let first: Vec<i32> = pipeflow::generate::seq(1, 2).take(5).collect();
/// assert_eq!(first, vec![1, 3, 5, 7, 9]);
/// ```
pub fn seq<T>(start: T, step: T) -> impl Iterator<Item = T>
where
    T: Add<Output = T> + Clone,
{
    std::iter::successors(Some(start), move |current| {
        Some(current.clone() + step.clone())
    })
}

/// Geometric sequence `initval, initval * ratio, initval * ratio^2, ...`.
/// Works with any type with `*` defined.
///
/// ```
/// let first: Vec<f64> = pipeflow::generate::gseq(1.0, 0.5).take(4).collect();
/// assert_eq!(first, vec![1.0, 0.5, 0.25, 0.125]);
/// ```
pub fn gseq<T>(initval: T, ratio: T) -> impl Iterator<Item = T>
where
    T: Mul<Output = T> + Clone,
{
    std::iter::successors(Some(initval), move |current| {
        Some(current.clone() * ratio.clone())
    })
}

/// Iterated application: `initval, func(initval), func(func(initval)), ...`.
///
/// ```
/// let first: Vec<u64> = pipeflow::generate::chaincall(2, |x| 3 * x).take(4).collect();
/// assert_eq!(first, vec![2, 6, 18, 54]);
/// ```
pub fn chaincall<T, F>(initval: T, mut func: F) -> impl Iterator<Item = T>
where
    T: Clone,
    F: FnMut(T) -> T,
{
    std::iter::successors(Some(initval), move |current| Some(func(current.clone())))
}
