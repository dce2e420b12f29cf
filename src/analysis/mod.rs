//! Analysis modules.
//!
//! Indicator scoring of profile text and fusion of all signals into a
//! confidence score and status.

pub mod aggregator;
pub mod indicators;

pub use aggregator::Checker;
