//! Submission state machine.
//!
//! ```text
//! Built ──Accepted──▶ Submitted ──PolledSuccess──▶ ConfirmedSuccess
//!   │                   │  ▲ │
//!   │                   │  └─┘ PolledNotFound
//!   │                   ├──PolledFailed──▶ ConfirmedFailed
//!   │                   └──AttemptsExhausted──▶ NotFoundTimeout
//!   └──Rejected──▶ Rejected
//! ```

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Built,
    Submitted,
    Rejected,
    ConfirmedSuccess,
    ConfirmedFailed,
    NotFoundTimeout,
}

impl SubmissionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SubmissionState::Built | SubmissionState::Submitted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionEvent {
    /// `sendTransaction` returned PENDING or DUPLICATE.
    Accepted,
    /// `sendTransaction` returned ERROR or TRY_AGAIN_LATER.
    Rejected,
    PolledNotFound,
    PolledSuccess,
    PolledFailed,
    AttemptsExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub from: SubmissionState,
    pub to: SubmissionState,
    pub reason: &'static str,
}

/// Apply `event` to `state`.
pub fn transition(
    state: SubmissionState,
    event: SubmissionEvent,
) -> Result<(SubmissionState, StateTransition)> {
    use SubmissionEvent as E;
    use SubmissionState as S;

    let (to, reason) = match (state, event) {
        (S::Built, E::Accepted) => (S::Submitted, "endpoint accepted envelope"),
        (S::Built, E::Rejected) => (S::Rejected, "endpoint rejected envelope"),
        (S::Submitted, E::PolledNotFound) => (S::Submitted, "status not yet known"),
        (S::Submitted, E::PolledSuccess) => (S::ConfirmedSuccess, "transaction succeeded"),
        (S::Submitted, E::PolledFailed) => (S::ConfirmedFailed, "transaction failed"),
        (S::Submitted, E::AttemptsExhausted) => (S::NotFoundTimeout, "poll budget exhausted"),
        (from, event) => {
            return Err(Error::IllegalTransition(format!("{:?} on {:?}", event, from)));
        }
    };

    Ok((
        to,
        StateTransition {
            from: state,
            to,
            reason,
        },
    ))
}
