//! Signing Gateway: hands envelopes to an external signer.
//!
//! # Responsibilities
//! - Send base64 envelope XDR, passphrase and signer address to the provider
//! - Map provider refusals to `SigningRejected` / `SigningUnavailable`
//! - Reject returned envelopes whose body differs from what was sent or whose
//!   signatures do not verify against the requested signer
//!
//! # Design Decisions
//! - No retry: a rejection is terminal for this attempt
//! - The gateway never talks to the RPC endpoint

use async_trait::async_trait;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use std::sync::Arc;
use thiserror::Error;

use crate::context::ClientContext;
use crate::error::{Error, Result};
use crate::network::Network;
use crate::strkey;
use crate::transaction::{transaction_hash, OutcomeKind, UnsignedEnvelope};
use crate::xdr::{
    self, read_limits, AccountId, DecoratedSignature, Hash, ReadXdr, TransactionEnvelope,
    TransactionV1Envelope, WriteXdr,
};

/// What the signing collaborator receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignRequest {
    /// Base64 `TransactionEnvelope` without signatures.
    pub envelope_xdr: String,
    pub network_passphrase: String,
    /// Strkey of the key expected to sign.
    pub signer_address: String,
}

/// Refusal reported by a signing collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignerError {
    /// The user or policy declined.
    #[error("rejected: {0}")]
    Rejected(String),
    /// The collaborator could not be reached.
    #[error("unavailable: {0}")]
    Unavailable(String),
}

/// External key holder, e.g. a wallet.
#[async_trait]
pub trait SigningProvider: Send + Sync {
    /// Return the signed envelope as base64 XDR.
    async fn sign_transaction(&self, request: SignRequest) -> std::result::Result<String, SignerError>;
}

/// An envelope with at least one verified signature.
///
/// Not `Clone`: submission consumes it, since a sequence number can only be
/// used once.
#[derive(Debug, PartialEq, Eq)]
pub struct SignedEnvelope {
    envelope: TransactionEnvelope,
    hash: Hash,
    network: Network,
    expected: OutcomeKind,
}

impl SignedEnvelope {
    pub fn hash(&self) -> Hash {
        self.hash.clone()
    }

    pub fn envelope(&self) -> &TransactionEnvelope {
        &self.envelope
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn expected_outcome(&self) -> OutcomeKind {
        self.expected
    }

    pub fn signatures(&self) -> &[DecoratedSignature] {
        match &self.envelope {
            TransactionEnvelope::Tx(v1) => &v1.signatures,
            _ => &[],
        }
    }

    pub fn to_xdr_base64(&self) -> Result<String> {
        Ok(self.envelope.to_xdr_base64(xdr::Limits::none())?)
    }

    /// Reassemble from an envelope signed out of band.
    pub fn from_parts(
        envelope: TransactionEnvelope,
        network: Network,
        expected: OutcomeKind,
    ) -> Result<Self> {
        let v1 = v1_of(&envelope).map_err(|_| {
            Error::InvalidInput("only v1 transaction envelopes are supported".into())
        })?;
        if v1.signatures.is_empty() {
            return Err(Error::InvalidInput("envelope carries no signatures".into()));
        }
        let hash = transaction_hash(&network, &v1.tx)?;
        Ok(Self {
            envelope,
            hash,
            network,
            expected,
        })
    }
}

/// Routes envelopes to a `SigningProvider`.
#[derive(Clone)]
pub struct SigningGateway {
    provider: Arc<dyn SigningProvider>,
}

impl SigningGateway {
    pub fn new(provider: Arc<dyn SigningProvider>) -> Self {
        Self { provider }
    }

    /// Ask the provider to sign `envelope` as `signer_address` on the
    /// context's network.
    pub async fn sign(
        &self,
        envelope: UnsignedEnvelope,
        signer_address: &str,
        ctx: &ClientContext,
    ) -> Result<SignedEnvelope> {
        if envelope.network() != &ctx.network {
            return Err(Error::InvalidInput(format!(
                "envelope built for {} but context is {}",
                envelope.network().name,
                ctx.network.name
            )));
        }
        let signer = strkey::decode_account(signer_address).map_err(|e| {
            Error::InvalidInput(format!("invalid signer address '{}': {}", signer_address, e))
        })?;

        let hash = envelope.hash()?;
        let request = SignRequest {
            envelope_xdr: envelope.to_xdr_base64()?,
            network_passphrase: ctx.network.passphrase.clone(),
            signer_address: signer_address.to_string(),
        };

        tracing::debug!(signer = %signer_address, hash = %hash, "Requesting signature");

        let signed_xdr = self
            .provider
            .sign_transaction(request)
            .await
            .map_err(|e| match e {
                SignerError::Rejected(reason) => {
                    tracing::info!(signer = %signer_address, reason = %reason, "Signing rejected");
                    Error::SigningRejected(reason)
                }
                SignerError::Unavailable(reason) => {
                    tracing::warn!(signer = %signer_address, reason = %reason, "Signer unavailable");
                    Error::SigningUnavailable(reason)
                }
            })?;

        let returned = TransactionEnvelope::from_xdr_base64(&signed_xdr, read_limits()).map_err(
            |e| Error::SigningRejected(format!("signer returned an undecodable envelope: {}", e)),
        )?;

        verify_signed(&envelope, &hash, &returned, &signer)?;

        Ok(SignedEnvelope {
            hash,
            network: envelope.network().clone(),
            expected: envelope.expected_outcome(),
            envelope: returned,
        })
    }
}

fn v1_of(envelope: &TransactionEnvelope) -> Result<&TransactionV1Envelope> {
    match envelope {
        TransactionEnvelope::Tx(v1) => Ok(v1),
        other => Err(Error::SigningRejected(format!(
            "signer returned a {} envelope",
            other.name()
        ))),
    }
}

fn verify_signed(
    sent: &UnsignedEnvelope,
    hash: &Hash,
    returned: &TransactionEnvelope,
    signer: &AccountId,
) -> Result<()> {
    let returned = v1_of(returned)?;
    if &returned.tx != sent.transaction() {
        return Err(Error::SigningRejected(
            "signer altered the transaction body".into(),
        ));
    }
    if returned.signatures.is_empty() {
        return Err(Error::SigningRejected("signer returned no signatures".into()));
    }

    let raw = xdr::account_key(signer);
    let key = VerifyingKey::from_bytes(&raw)
        .map_err(|e| Error::InvalidInput(format!("signer key is not a valid ed25519 point: {}", e)))?;
    let hint = &raw[28..];

    let verified = returned.signatures.iter().any(|sig| {
        sig.hint.0 == hint
            && Signature::from_slice(sig.signature.0.as_slice())
                .map(|s| key.verify(&hash.0, &s).is_ok())
                .unwrap_or(false)
    });
    if !verified {
        return Err(Error::SigningRejected(
            "no valid signature from the requested signer".into(),
        ));
    }
    Ok(())
}
