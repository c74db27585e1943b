//! In-process ed25519 signer.
//!
//! # Security
//! - Secret seeds are loaded ONLY from environment variables or passed in
//! - Seeds are never logged or serialized

use async_trait::async_trait;
use ed25519_dalek::{Signer as _, SigningKey};

use crate::error::{Error, Result};
use crate::network::Network;
use crate::signing::gateway::{SignRequest, SignerError, SigningProvider};
use crate::strkey;
use crate::transaction::transaction_hash;
use crate::xdr::{
    self, read_limits, AccountId, DecoratedSignature, Hash, Limits, ReadXdr, SignatureHint,
    TransactionEnvelope, WriteXdr,
};

/// Default environment variable holding an `S…` secret seed.
pub const SECRET_KEY_ENV_VAR: &str = "SOROBAN_SECRET_KEY";

/// A local keypair acting as the signing collaborator.
pub struct LocalKeypairSigner {
    key: SigningKey,
    account_id: AccountId,
    address: String,
}

impl LocalKeypairSigner {
    /// Create a signer from a strkey secret seed.
    pub fn from_secret(secret: &str) -> Result<Self> {
        let seed = strkey::decode_seed(secret.trim())
            .map_err(|e| Error::Config(format!("Invalid secret key: {}", e)))?;
        Ok(Self::from_seed(&seed))
    }

    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let key = SigningKey::from_bytes(seed);
        let account_id = xdr::account_id(key.verifying_key().to_bytes());
        let address = strkey::encode_account(&account_id);

        tracing::info!(address = %address, "Local signer initialized");

        Self {
            key,
            account_id,
            address,
        }
    }

    /// Load the seed from the environment variable `var`.
    pub fn from_env(var: &str) -> Result<Self> {
        let secret = std::env::var(var)
            .map_err(|_| Error::Config(format!("Environment variable {} not set", var)))?;
        Self::from_secret(&secret)
    }

    /// `G…` address of this key.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id.clone()
    }

    /// Sign a transaction hash, producing a decorated signature.
    pub fn sign_hash(&self, hash: &Hash) -> Result<DecoratedSignature> {
        let signature = self.key.sign(&hash.0);
        let mut hint = [0u8; 4];
        hint.copy_from_slice(&xdr::account_key(&self.account_id)[28..]);
        Ok(DecoratedSignature {
            hint: SignatureHint(hint),
            signature: xdr::Signature(signature.to_bytes().to_vec().try_into()?),
        })
    }

    /// Append this key's signature to a v1 envelope for `network`.
    pub fn sign_envelope(
        &self,
        envelope: TransactionEnvelope,
        network: &Network,
    ) -> Result<TransactionEnvelope> {
        let TransactionEnvelope::Tx(mut v1) = envelope else {
            return Err(Error::InvalidInput(
                "only v1 transaction envelopes can be signed".into(),
            ));
        };
        let hash = transaction_hash(network, &v1.tx)?;
        let mut signatures = v1.signatures.to_vec();
        signatures.push(self.sign_hash(&hash)?);
        v1.signatures = signatures.try_into()?;
        Ok(TransactionEnvelope::Tx(v1))
    }
}

impl std::fmt::Debug for LocalKeypairSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalKeypairSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SigningProvider for LocalKeypairSigner {
    async fn sign_transaction(&self, request: SignRequest) -> std::result::Result<String, SignerError> {
        if request.signer_address != self.address {
            return Err(SignerError::Rejected(format!(
                "no key for {}",
                request.signer_address
            )));
        }
        let envelope = TransactionEnvelope::from_xdr_base64(&request.envelope_xdr, read_limits())
            .map_err(|e| SignerError::Rejected(format!("cannot parse envelope: {}", e)))?;

        let network = Network::new("request", request.network_passphrase);
        self.sign_envelope(envelope, &network)
            .and_then(|signed| Ok(signed.to_xdr_base64(Limits::none())?))
            .map_err(|e| SignerError::Rejected(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ClientContext;
    use crate::signing::gateway::SigningGateway;
    use crate::transaction::{Account, EnvelopeBuilder, FixedClock, Operation, Timeout};
    use std::sync::Arc;

    const SEED: [u8; 32] = [7u8; 32];

    #[test]
    fn test_from_secret_round_trip() {
        let secret = strkey::encode_seed(&SEED);
        let signer = LocalKeypairSigner::from_secret(&secret).unwrap();
        assert!(signer.address().starts_with('G'));
        assert_eq!(signer.address(), LocalKeypairSigner::from_seed(&SEED).address());
    }

    #[test]
    fn test_invalid_secret() {
        let err = LocalKeypairSigner::from_secret("SNOTASEED").unwrap_err();
        assert!(err.to_string().contains("Invalid secret key"));
    }

    #[test]
    fn test_missing_env_var() {
        let err = LocalKeypairSigner::from_env("SOROBAN_LIFECYCLE_TEST_UNSET_VAR").unwrap_err();
        assert!(err.to_string().contains("not set"));
    }

    #[tokio::test]
    async fn test_gateway_accepts_local_signature() {
        let signer = Arc::new(LocalKeypairSigner::from_seed(&SEED));
        let address = signer.address().to_string();
        let envelope = EnvelopeBuilder::with_clock(FixedClock(0))
            .build(
                &Account::new(address.clone(), 1),
                &[Operation::RestoreFootprint],
                100,
                &Network::testnet(),
                Timeout::Infinite,
            )
            .unwrap();
        let expected_hash = envelope.hash().unwrap();

        let endpoint = Arc::new(crate::rpc::JsonRpcClient::new(&Default::default()).unwrap());
        let ctx = ClientContext::with_endpoint(endpoint, Network::testnet());
        let signed = SigningGateway::new(signer)
            .sign(envelope, &address, &ctx)
            .await
            .unwrap();

        assert_eq!(signed.hash(), expected_hash);
        assert_eq!(signed.signatures().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_signer_rejected() {
        let signer = LocalKeypairSigner::from_seed(&SEED);
        let other = strkey::encode_account(&xdr::account_id([1u8; 32]));
        let request = SignRequest {
            envelope_xdr: String::new(),
            network_passphrase: Network::testnet().passphrase,
            signer_address: other,
        };
        assert!(matches!(
            signer.sign_transaction(request).await,
            Err(SignerError::Rejected(_))
        ));
    }

    #[test]
    fn test_signatures_accumulate() {
        let first = LocalKeypairSigner::from_seed(&SEED);
        let second = LocalKeypairSigner::from_seed(&[8u8; 32]);
        let envelope = EnvelopeBuilder::with_clock(FixedClock(0))
            .build(
                &Account::new(first.address(), 1),
                &[Operation::RestoreFootprint],
                100,
                &Network::testnet(),
                Timeout::Infinite,
            )
            .unwrap()
            .envelope();
        let signed = first.sign_envelope(envelope, &Network::testnet()).unwrap();
        let signed = second.sign_envelope(signed, &Network::testnet()).unwrap();
        match signed {
            TransactionEnvelope::Tx(v1) => {
                assert_eq!(v1.signatures.len(), 2);
                assert_ne!(v1.signatures[0].hint, v1.signatures[1].hint);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
