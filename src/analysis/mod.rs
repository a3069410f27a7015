//! Statistics aggregation.
//!
//! The aggregation core is a pure function from a record batch to a
//! [`crate::models::Summary`]; everything else in the crate either feeds
//! it or renders its output.

pub mod aggregator;

pub use aggregator::*;
