//! Ledger wire types.
//!
//! The schema is `stellar-xdr`'s current protocol, re-exported as-is. This
//! module only adds the read limits applied to untrusted input and a few
//! value helpers.

pub use stellar_xdr::curr::*;

/// Maximum nesting when reading XDR that came from the endpoint or a signer.
///
/// Every nested type counts against it, not only `ScVal` levels. The Soroban
/// host reads XDR with the same depth.
pub const DEPTH_LIMIT: u32 = 500;

/// Limits for decoding untrusted XDR.
pub fn read_limits() -> Limits {
    Limits::depth(DEPTH_LIMIT)
}

/// `ScVal::Symbol` from a Rust string.
pub fn symbol(name: &str) -> std::result::Result<ScVal, Error> {
    Ok(ScVal::Symbol(ScSymbol(name.try_into()?)))
}

pub fn i128_val(n: i128) -> ScVal {
    ScVal::I128(Int128Parts {
        hi: (n >> 64) as i64,
        lo: n as u64,
    })
}

pub fn u128_val(n: u128) -> ScVal {
    ScVal::U128(UInt128Parts {
        hi: (n >> 64) as u64,
        lo: n as u64,
    })
}

/// Integer value of any integer `ScVal` that fits in an `i128`.
pub fn as_integer(value: &ScVal) -> Option<i128> {
    match value {
        ScVal::U32(n) => Some(i128::from(*n)),
        ScVal::I32(n) => Some(i128::from(*n)),
        ScVal::U64(n) => Some(i128::from(*n)),
        ScVal::I64(n) => Some(i128::from(*n)),
        ScVal::I128(parts) => Some((i128::from(parts.hi) << 64) | i128::from(parts.lo)),
        ScVal::U128(parts) => {
            i128::try_from((u128::from(parts.hi) << 64) | u128::from(parts.lo)).ok()
        }
        _ => None,
    }
}

pub fn account_id(key: [u8; 32]) -> AccountId {
    AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(key)))
}

/// Raw ed25519 key of an account.
pub fn account_key(id: &AccountId) -> [u8; 32] {
    let AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(key))) = id;
    *key
}

pub fn contract_address(contract: &Hash) -> ScAddress {
    ScAddress::Contract(ContractId(contract.clone()))
}
