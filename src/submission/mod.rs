//! Submission and confirmation.
//!
//! A [`Submitter`] sends a signed envelope once, then polls `getTransaction`
//! until the network reports `SUCCESS` or `FAILED`, the poll budget runs out,
//! or the caller cancels. Progress is tracked by the transition function in
//! [`state`]; illegal moves are errors rather than silent no-ops.

pub mod cache;
pub mod policy;
pub mod result;
pub mod state;
pub mod submitter;

pub use cache::ResultCache;
pub use policy::{Backoff, PollPolicy};
pub use result::{TransactionResult, TransactionResultSummary};
pub use state::{transition, StateTransition, SubmissionEvent, SubmissionState};
pub use submitter::Submitter;
