//! Cardinality estimation algorithms
//!
//! This module provides probabilistic algorithms for counting unique items
//! in large data streams.

mod hyperloglog;

pub use hyperloglog::{Envelope, HyperLogLogPlus};
