//! Resilience helpers.
//!
//! # Design Decisions
//! - Polling is the only retry loop in the lifecycle; it is bounded by
//!   attempts, never triggered by errors
//! - Submission is never retried automatically

pub mod backoff;
