//! Terminal transaction outcomes.

use crate::error::Result;
use crate::transaction::OutcomeKind;
use crate::xdr::{self, read_limits, Hash, ReadXdr, TransactionResultCode};

/// Fee and result code of a `TransactionResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionResultSummary {
    pub fee_charged: i64,
    pub code: TransactionResultCode,
}

impl TransactionResultSummary {
    /// Summarize a base64 `TransactionResult` as returned in `resultXdr` or
    /// `errorResultXdr`.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let result = xdr::TransactionResult::from_xdr_base64(encoded, read_limits())?;
        Ok(Self {
            fee_charged: result.fee_charged,
            code: result.result.discriminant(),
        })
    }
}

impl std::fmt::Display for TransactionResultSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (fee charged {})", self.code.name(), self.fee_charged)
    }
}

/// Terminal status of a submitted transaction.
///
/// A poll budget running out is not a result: it surfaces as
/// `Error::PollingTimeout` carrying the hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionResult {
    Success {
        hash: Hash,
        ledger: u32,
        /// Raw `TransactionMeta` XDR; empty if the endpoint sent none.
        meta: Vec<u8>,
        /// What the decoder should extract from `meta`.
        expected: OutcomeKind,
    },
    Failed {
        hash: Hash,
        ledger: u32,
        /// Fee and result code, when the endpoint returned `resultXdr`.
        result: Option<TransactionResultSummary>,
    },
}

impl TransactionResult {
    pub fn hash(&self) -> Hash {
        match self {
            TransactionResult::Success { hash, .. } | TransactionResult::Failed { hash, .. } => {
                hash.clone()
            }
        }
    }

    pub fn ledger(&self) -> u32 {
        match self {
            TransactionResult::Success { ledger, .. } | TransactionResult::Failed { ledger, .. } => {
                *ledger
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TransactionResult::Success { .. })
    }

    /// Re-target a success at the outcome a particular caller expects.
    ///
    /// The ledger record is shared by everyone awaiting the hash; what to
    /// extract from it is not.
    pub fn with_expected(self, kind: OutcomeKind) -> Self {
        match self {
            TransactionResult::Success {
                hash, ledger, meta, ..
            } => TransactionResult::Success {
                hash,
                ledger,
                meta,
                expected: kind,
            },
            failed => failed,
        }
    }

    /// Label used for logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            TransactionResult::Success { .. } => "success",
            TransactionResult::Failed { .. } => "failed",
        }
    }
}
