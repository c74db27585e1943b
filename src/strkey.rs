//! Conversions between strkey addresses and ledger types.
//!
//! Encoding and checksums are `stellar-strkey`'s.

use stellar_strkey::{ed25519, Contract, Strkey};

pub use stellar_strkey::DecodeError as StrkeyError;

use crate::xdr::{self, AccountId, Hash, ScAddress};

/// `G…` address to account id.
pub fn decode_account(address: &str) -> Result<AccountId, StrkeyError> {
    Ok(xdr::account_id(ed25519::PublicKey::from_string(address)?.0))
}

pub fn encode_account(id: &AccountId) -> String {
    ed25519::PublicKey(xdr::account_key(id)).to_string()
}

/// `C…` address to contract id.
pub fn decode_contract(address: &str) -> Result<Hash, StrkeyError> {
    Ok(Hash(Contract::from_string(address)?.0))
}

pub fn encode_contract(contract: &Hash) -> String {
    Contract(contract.0).to_string()
}

/// `S…` secret seed.
pub fn decode_seed(secret: &str) -> Result<[u8; 32], StrkeyError> {
    Ok(ed25519::PrivateKey::from_string(secret)?.0)
}

pub fn encode_seed(seed: &[u8; 32]) -> String {
    ed25519::PrivateKey(*seed).to_string()
}

/// Account or contract address.
pub fn decode_address(address: &str) -> Result<ScAddress, StrkeyError> {
    match Strkey::from_string(address)? {
        Strkey::PublicKeyEd25519(key) => Ok(ScAddress::Account(xdr::account_id(key.0))),
        Strkey::Contract(contract) => Ok(xdr::contract_address(&Hash(contract.0))),
        _ => Err(StrkeyError::Invalid),
    }
}

/// Strkey form of an address; other address kinds print as their XDR debug form.
pub fn encode_address(address: &ScAddress) -> String {
    match address {
        ScAddress::Account(id) => encode_account(id),
        ScAddress::Contract(xdr::ContractId(hash)) => encode_contract(hash),
        other => format!("{:?}", other),
    }
}
