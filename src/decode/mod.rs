//! Result decoding.
//!
//! # Responsibilities
//! - Extract the typed outcome of a confirmed transaction from its metadata
//! - Decode contract interfaces embedded in WASM (`contractspecv0`)
//! - Fetch contract code and interfaces through the RPC endpoint
//!
//! # Design Decisions
//! - Decoding is pure: the same `TransactionResult` always yields the same
//!   outcome or the same error.
//! - The expected shape is fixed at build time from the operation, so a
//!   mismatch is reported instead of coerced.

pub mod contract;
pub mod spec;
pub mod wasm;

use crate::error::{Error, Result};
use crate::submission::TransactionResult;
use crate::transaction::OutcomeKind;
use crate::xdr::{read_limits, ContractId, Hash, ReadXdr, ScAddress, ScBytes, ScVal, TransactionMeta};

pub use contract::{
    code_key, contract_id_from_address, contract_id_from_asset, extend_footprint, fetch_contract_instance,
    fetch_contract_spec, fetch_contract_wasm, fetch_wasm_by_hash, instance_key, restore_footprint,
};
pub use spec::{decode_spec_entries, decode_spec_entries_streaming};
pub use wasm::{custom_section, WasmError, CONTRACT_SPEC_SECTION};

/// Typed outcome of a successful transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedOutcome {
    /// Return value of a contract invocation.
    Value(ScVal),
    /// Hash of uploaded contract code.
    WasmHash(Hash),
    /// Id of a newly created contract.
    ContractId(Hash),
    /// Operation applied; nothing to return.
    Applied,
}

impl DecodedOutcome {
    pub fn value(&self) -> Option<&ScVal> {
        match self {
            DecodedOutcome::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// Decode the outcome of `result` according to its expected shape.
///
/// Metadata is read with the crate's depth limit, so a hostile endpoint
/// cannot exhaust the stack with deeply nested values.
pub fn decode(result: &TransactionResult) -> Result<DecodedOutcome> {
    let (meta, expected) = match result {
        TransactionResult::Success { meta, expected, .. } => (meta, *expected),
        TransactionResult::Failed { result, .. } => {
            let found = match result {
                Some(summary) => format!("failed transaction: {}", summary),
                None => "failed transaction".to_string(),
            };
            return Err(Error::shape("successful transaction", found));
        }
    };

    if expected == OutcomeKind::Applied {
        return Ok(DecodedOutcome::Applied);
    }

    if meta.is_empty() {
        return Err(Error::shape("transaction meta v3 or v4", "no metadata"));
    }
    let return_value = match TransactionMeta::from_xdr(meta, read_limits())? {
        TransactionMeta::V3(v3) => v3.soroban_meta.map(|soroban| soroban.return_value),
        TransactionMeta::V4(v4) => v4.soroban_meta.and_then(|soroban| soroban.return_value),
        other => {
            return Err(Error::shape(
                "transaction meta v3 or v4",
                format!("transaction meta {}", other.name()),
            ))
        }
    };
    let Some(return_value) = return_value else {
        return Err(Error::shape("soroban return value", "none"));
    };

    match expected {
        OutcomeKind::Value => Ok(DecodedOutcome::Value(return_value)),
        OutcomeKind::WasmHash => match return_value {
            ScVal::Bytes(ScBytes(bytes)) => match <[u8; 32]>::try_from(bytes.as_slice()) {
                Ok(hash) => Ok(DecodedOutcome::WasmHash(Hash(hash))),
                Err(_) => Err(Error::shape(
                    "32-byte wasm hash",
                    format!("{} bytes", bytes.len()),
                )),
            },
            other => Err(Error::shape("32-byte wasm hash", other.name())),
        },
        OutcomeKind::ContractId => match return_value {
            ScVal::Address(ScAddress::Contract(ContractId(id))) => {
                Ok(DecodedOutcome::ContractId(id))
            }
            ScVal::Address(other) => Err(Error::shape(
                "contract address",
                format!("{} address", other.name()),
            )),
            other => Err(Error::shape("contract address", other.name())),
        },
        OutcomeKind::Applied => Ok(DecodedOutcome::Applied),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::TransactionResultSummary;
    use crate::xdr::{
        self, ExtensionPoint, LedgerEntryChanges, Limits, ScError, SorobanTransactionMeta,
        SorobanTransactionMetaExt, SorobanTransactionMetaV2, TransactionMetaV2,
        TransactionMetaV3, TransactionMetaV4, TransactionResultCode, UInt256Parts, VecM,
        WriteXdr,
    };

    fn no_changes() -> LedgerEntryChanges {
        LedgerEntryChanges(VecM::default())
    }

    fn meta_v3(return_value: ScVal) -> Vec<u8> {
        TransactionMeta::V3(TransactionMetaV3 {
            ext: ExtensionPoint::V0,
            tx_changes_before: no_changes(),
            operations: VecM::default(),
            tx_changes_after: no_changes(),
            soroban_meta: Some(SorobanTransactionMeta {
                ext: SorobanTransactionMetaExt::V0,
                events: VecM::default(),
                return_value,
                diagnostic_events: VecM::default(),
            }),
        })
        .to_xdr(Limits::none())
        .unwrap()
    }

    fn meta_v4(return_value: Option<ScVal>) -> Vec<u8> {
        TransactionMeta::V4(TransactionMetaV4 {
            ext: ExtensionPoint::V0,
            tx_changes_before: no_changes(),
            operations: VecM::default(),
            tx_changes_after: no_changes(),
            soroban_meta: Some(SorobanTransactionMetaV2 {
                ext: SorobanTransactionMetaExt::V0,
                return_value,
            }),
            events: VecM::default(),
            diagnostic_events: VecM::default(),
        })
        .to_xdr(Limits::none())
        .unwrap()
    }

    fn success(meta: Vec<u8>, expected: OutcomeKind) -> TransactionResult {
        TransactionResult::Success {
            hash: Hash([9; 32]),
            ledger: 100,
            meta,
            expected,
        }
    }

    fn success_with(return_value: ScVal, expected: OutcomeKind) -> TransactionResult {
        success(meta_v3(return_value), expected)
    }

    #[test]
    fn test_decode_invoke_value() {
        let result = success_with(xdr::i128_val(1000), OutcomeKind::Value);
        let outcome = decode(&result).unwrap();
        assert_eq!(outcome.value().and_then(xdr::as_integer), Some(1000));
    }

    #[test]
    fn test_decode_is_idempotent() {
        let result = success_with(xdr::symbol("hello").unwrap(), OutcomeKind::Value);
        assert_eq!(decode(&result).unwrap(), decode(&result).unwrap());
    }

    #[test]
    fn test_decode_wide_and_error_values() {
        let wide = ScVal::U256(UInt256Parts {
            hi_hi: 1,
            hi_lo: 2,
            lo_hi: 3,
            lo_lo: 4,
        });
        let result = success_with(wide.clone(), OutcomeKind::Value);
        assert_eq!(decode(&result).unwrap(), DecodedOutcome::Value(wide));

        let contract_error = ScVal::Error(ScError::Contract(3));
        let result = success_with(contract_error.clone(), OutcomeKind::Value);
        assert_eq!(decode(&result).unwrap(), DecodedOutcome::Value(contract_error));
    }

    #[test]
    fn test_decode_meta_v4() {
        let result = success(meta_v4(Some(ScVal::U32(7))), OutcomeKind::Value);
        assert_eq!(decode(&result).unwrap(), DecodedOutcome::Value(ScVal::U32(7)));

        let result = success(meta_v4(None), OutcomeKind::Value);
        assert!(matches!(
            decode(&result),
            Err(Error::UnexpectedResultShape { .. })
        ));
    }

    #[test]
    fn test_deeply_nested_meta_is_an_error() {
        // Replace the Void return value with 200k levels of single-element
        // vectors around it: disc SCV_VEC, option present, length 1.
        let mut meta = meta_v3(ScVal::Void);
        let tail = meta.split_off(meta.len() - 8);
        for _ in 0..200_000 {
            meta.extend_from_slice(&[0, 0, 0, 16, 0, 0, 0, 1, 0, 0, 0, 1]);
        }
        meta.extend_from_slice(&tail);

        let result = success(meta, OutcomeKind::Value);
        assert!(matches!(decode(&result), Err(Error::Xdr(_))));
    }

    #[test]
    fn test_decode_wasm_hash() {
        let bytes = ScVal::Bytes(ScBytes(vec![0xab; 32].try_into().unwrap()));
        let result = success_with(bytes, OutcomeKind::WasmHash);
        assert_eq!(
            decode(&result).unwrap(),
            DecodedOutcome::WasmHash(Hash([0xab; 32]))
        );
    }

    #[test]
    fn test_wasm_hash_wrong_length() {
        let bytes = ScVal::Bytes(ScBytes(vec![1; 31].try_into().unwrap()));
        let result = success_with(bytes, OutcomeKind::WasmHash);
        match decode(&result) {
            Err(Error::UnexpectedResultShape { found, .. }) => assert_eq!(found, "31 bytes"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_decode_contract_id() {
        let id = Hash([0x11; 32]);
        let result = success_with(
            ScVal::Address(xdr::contract_address(&id)),
            OutcomeKind::ContractId,
        );
        assert_eq!(decode(&result).unwrap(), DecodedOutcome::ContractId(id));

        let account = ScVal::Address(ScAddress::Account(xdr::account_id([0; 32])));
        let result = success_with(account, OutcomeKind::ContractId);
        assert!(matches!(
            decode(&result),
            Err(Error::UnexpectedResultShape { .. })
        ));
    }

    #[test]
    fn test_applied_ignores_meta() {
        let result = success(vec![0xff, 0xff], OutcomeKind::Applied);
        assert_eq!(decode(&result).unwrap(), DecodedOutcome::Applied);
    }

    #[test]
    fn test_failed_names_result_code() {
        let result = TransactionResult::Failed {
            hash: Hash([0; 32]),
            ledger: 1,
            result: Some(TransactionResultSummary {
                fee_charged: 100,
                code: TransactionResultCode::TxFailed,
            }),
        };
        match decode(&result) {
            Err(Error::UnexpectedResultShape { found, .. }) => assert!(found.contains("TxFailed")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_pre_soroban_meta_rejected() {
        let meta = TransactionMeta::V2(TransactionMetaV2 {
            tx_changes_before: no_changes(),
            operations: VecM::default(),
            tx_changes_after: no_changes(),
        })
        .to_xdr(Limits::none())
        .unwrap();
        match decode(&success(meta, OutcomeKind::Value)) {
            Err(Error::UnexpectedResultShape { found, .. }) => {
                assert_eq!(found, "transaction meta V2")
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
