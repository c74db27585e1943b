//! The unsigned envelope produced by the builder.

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::network::Network;
use crate::transaction::operation::OutcomeKind;
use crate::xdr::{
    Hash, Limits, Memo, OperationBody, SorobanAuthorizationEntry, SorobanTransactionData,
    Transaction, TransactionEnvelope, TransactionExt, TransactionSignaturePayload,
    TransactionSignaturePayloadTaggedTransaction, TransactionV1Envelope, VecM, WriteXdr,
};

/// A built transaction that has not been signed yet.
///
/// Memo, Soroban resource data and authorization entries may only be
/// attached here; once handed to the signing gateway the body is fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedEnvelope {
    tx: Transaction,
    network: Network,
    expected: OutcomeKind,
}

impl UnsignedEnvelope {
    pub(crate) fn new(tx: Transaction, network: Network, expected: OutcomeKind) -> Self {
        Self {
            tx,
            network,
            expected,
        }
    }

    pub fn with_memo(mut self, memo: Memo) -> Self {
        self.tx.memo = memo;
        self
    }

    /// Attach the footprint and resources. The resource fee replaces any
    /// previously attached one on top of the inclusion fee.
    pub fn with_soroban_data(mut self, data: SorobanTransactionData) -> Result<Self> {
        let previous = match &self.tx.ext {
            TransactionExt::V1(old) => old.resource_fee,
            TransactionExt::V0 => 0,
        };
        let inclusion = i64::from(self.tx.fee) - previous;
        let fee = inclusion
            .checked_add(data.resource_fee)
            .and_then(|f| u32::try_from(f).ok())
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "resource fee {} does not fit the transaction fee",
                    data.resource_fee
                ))
            })?;
        self.tx.fee = fee;
        self.tx.ext = TransactionExt::V1(data);
        Ok(self)
    }

    /// Attach authorization entries to the host function call.
    ///
    /// Entries already present are kept; an envelope without a host
    /// function call is returned unchanged.
    pub fn with_auth(mut self, auth: Vec<SorobanAuthorizationEntry>) -> Result<Self> {
        if auth.is_empty() {
            return Ok(self);
        }
        let mut operations = self.tx.operations.to_vec();
        if let [op] = operations.as_mut_slice() {
            if let OperationBody::InvokeHostFunction(invoke) = &mut op.body {
                if invoke.auth.is_empty() {
                    invoke.auth = auth.try_into()?;
                }
            }
        }
        self.tx.operations = operations.try_into()?;
        Ok(self)
    }

    pub fn transaction(&self) -> &Transaction {
        &self.tx
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Outcome the decoder should expect once this transaction succeeds.
    pub fn expected_outcome(&self) -> OutcomeKind {
        self.expected
    }

    /// Whether the body calls into Soroban and so needs resource data.
    pub fn is_soroban(&self) -> bool {
        self.tx.operations.iter().any(|op| {
            matches!(
                op.body,
                OperationBody::InvokeHostFunction(_)
                    | OperationBody::ExtendFootprintTtl(_)
                    | OperationBody::RestoreFootprint(_)
            )
        })
    }

    /// Transaction hash; also the submission handle.
    pub fn hash(&self) -> Result<Hash> {
        transaction_hash(&self.network, &self.tx)
    }

    /// Envelope XDR with an empty signature list.
    pub fn to_xdr_base64(&self) -> Result<String> {
        Ok(self.envelope().to_xdr_base64(Limits::none())?)
    }

    pub fn envelope(&self) -> TransactionEnvelope {
        TransactionEnvelope::Tx(TransactionV1Envelope {
            tx: self.tx.clone(),
            signatures: VecM::default(),
        })
    }
}

/// `sha256(network_id || ENVELOPE_TYPE_TX || tx)`.
pub fn transaction_hash(network: &Network, tx: &Transaction) -> Result<Hash> {
    let payload = TransactionSignaturePayload {
        network_id: network.network_id(),
        tagged_transaction: TransactionSignaturePayloadTaggedTransaction::Tx(tx.clone()),
    };
    Ok(Hash(Sha256::digest(payload.to_xdr(Limits::none())?).into()))
}

/// Text memo of at most 28 bytes.
pub fn text_memo(text: &str) -> Result<Memo> {
    let bounded = text.try_into().map_err(|_| {
        Error::InvalidInput(format!("memo text is {} bytes, maximum is 28", text.len()))
    })?;
    Ok(Memo::Text(bounded))
}
