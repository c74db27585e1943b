//! Error taxonomy for the transaction lifecycle.

use thiserror::Error;

use crate::decode::WasmError;
use crate::strkey::StrkeyError;
use crate::submission::TransactionResultSummary;
use crate::xdr::Hash;

/// Errors that can occur while building, signing, submitting or decoding.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed call into the envelope builder. Not retried.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The signing collaborator declined to sign.
    #[error("signing rejected: {0}")]
    SigningRejected(String),

    /// Simulation reported an error or archived state; nothing was signed.
    #[error("simulation failed: {0}")]
    SimulationFailed(String),

    /// The signing collaborator could not be reached.
    #[error("signing unavailable: {0}")]
    SigningUnavailable(String),

    /// The endpoint refused the envelope outright; no polling happened.
    #[error("submission rejected ({status}): {}", describe_rejection(.result))]
    SubmissionRejected {
        status: String,
        hash: Hash,
        result: Option<TransactionResultSummary>,
    },

    /// No terminal status within the attempt budget. The transaction may
    /// still land; poll `hash` again or rebuild with a fresh sequence.
    #[error("transaction {hash} still pending after {attempts} polls")]
    PollingTimeout { hash: Hash, attempts: u32 },

    /// The result did not have the shape the submitted operation implies.
    #[error("unexpected result shape: expected {expected}, found {found}")]
    UnexpectedResultShape { expected: String, found: String },

    /// Transport or protocol failure talking to the RPC endpoint.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC call exceeded its deadline.
    #[error("RPC timeout after {0} seconds")]
    RpcTimeout(u64),

    /// Requested ledger entry does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("XDR error: {0}")]
    Xdr(#[from] stellar_xdr::curr::Error),

    #[error("address error: {0}")]
    Strkey(#[from] StrkeyError),

    #[error("WASM error: {0}")]
    Wasm(#[from] WasmError),

    #[error("configuration error: {0}")]
    Config(String),

    /// Internal state machine misuse.
    #[error("illegal state transition: {0}")]
    IllegalTransition(String),

    /// Polling was abandoned by the caller.
    #[error("cancelled while awaiting transaction {0}")]
    Cancelled(Hash),
}

fn describe_rejection(result: &Option<TransactionResultSummary>) -> String {
    match result {
        Some(summary) => summary.to_string(),
        None => "no result returned".to_string(),
    }
}

impl Error {
    /// Whether the caller may retry with a freshly built envelope.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::PollingTimeout { .. } | Error::Rpc(_) | Error::RpcTimeout(_)
        )
    }

    pub(crate) fn shape(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Error::UnexpectedResultShape {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Result type for lifecycle operations.
pub type Result<T> = std::result::Result<T, Error>;
