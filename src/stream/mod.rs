//! Stream utilities for subscription APIs.

mod distinct;

pub use distinct::{Distinct, DistinctExt};
