//! Typed operations accepted by the envelope builder.

use crate::error::{Error, Result};
use crate::xdr::{
    self, AccountId, AlphaNum12, AlphaNum4, Asset, AssetCode12, AssetCode4, ChangeTrustAsset,
    ChangeTrustOp, ContractExecutable, ContractIdPreimage, CreateContractArgs, ExtendFootprintTtlOp,
    ExtensionPoint, Hash, HostFunction, InvokeContractArgs, InvokeHostFunctionOp, MuxedAccount,
    OperationBody, PaymentOp, RestoreFootprintOp, ScSymbol, ScVal, Uint256, VecM,
};

/// Longest contract function name.
const SYMBOL_LIMIT: usize = 32;

/// One atomic action within an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Call `function` on a deployed contract.
    Invoke {
        contract: Hash,
        function: String,
        args: Vec<ScVal>,
    },
    /// Instantiate a contract from uploaded code or a classic asset.
    CreateContract {
        preimage: ContractIdPreimage,
        executable: ContractExecutable,
    },
    /// Install contract WASM.
    UploadCode { wasm: Vec<u8> },
    ChangeTrust { asset: Asset, limit: i64 },
    Payment {
        destination: AccountId,
        asset: Asset,
        amount: i64,
    },
    /// Extend the TTL of the footprint's entries to `extend_to` ledgers.
    ExtendFootprint { extend_to: u32 },
    /// Restore the archived entries of the read-write footprint.
    RestoreFootprint,
}

/// What the result decoder should find for a confirmed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// The invocation's return value.
    Value,
    /// Hash of uploaded WASM.
    WasmHash,
    /// Address of a created contract.
    ContractId,
    /// Classic or footprint operation without a return value.
    Applied,
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OutcomeKind::Value => "return value",
            OutcomeKind::WasmHash => "wasm hash",
            OutcomeKind::ContractId => "contract id",
            OutcomeKind::Applied => "applied",
        })
    }
}

/// Credit asset with a 1-12 character code.
pub fn credit_asset(code: &str, issuer: AccountId) -> Result<Asset> {
    let bytes = code.as_bytes();
    if bytes.is_empty() || bytes.len() > 12 || !bytes.iter().all(u8::is_ascii_alphanumeric) {
        return Err(Error::InvalidInput(format!("invalid asset code '{}'", code)));
    }
    if bytes.len() <= 4 {
        let mut padded = [0u8; 4];
        padded[..bytes.len()].copy_from_slice(bytes);
        Ok(Asset::CreditAlphanum4(AlphaNum4 {
            asset_code: AssetCode4(padded),
            issuer,
        }))
    } else {
        let mut padded = [0u8; 12];
        padded[..bytes.len()].copy_from_slice(bytes);
        Ok(Asset::CreditAlphanum12(AlphaNum12 {
            asset_code: AssetCode12(padded),
            issuer,
        }))
    }
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Invoke { .. } => "invoke",
            Operation::CreateContract { .. } => "create_contract",
            Operation::UploadCode { .. } => "upload_code",
            Operation::ChangeTrust { .. } => "change_trust",
            Operation::Payment { .. } => "payment",
            Operation::ExtendFootprint { .. } => "extend_footprint",
            Operation::RestoreFootprint => "restore_footprint",
        }
    }

    /// Soroban operations must be alone in their transaction.
    pub fn is_soroban(&self) -> bool {
        !matches!(self, Operation::ChangeTrust { .. } | Operation::Payment { .. })
    }

    pub fn expected_outcome(&self) -> OutcomeKind {
        match self {
            Operation::Invoke { .. } => OutcomeKind::Value,
            Operation::UploadCode { .. } => OutcomeKind::WasmHash,
            Operation::CreateContract { .. } => OutcomeKind::ContractId,
            _ => OutcomeKind::Applied,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Operation::Invoke { function, .. } => {
                if function.is_empty() || function.len() > SYMBOL_LIMIT {
                    return Err(Error::InvalidInput(format!(
                        "function name must be 1..={} characters, got {}",
                        SYMBOL_LIMIT,
                        function.len()
                    )));
                }
                if !function.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(Error::InvalidInput(format!(
                        "function name '{}' is not a valid symbol",
                        function
                    )));
                }
            }
            Operation::UploadCode { wasm } if wasm.is_empty() => {
                return Err(Error::InvalidInput("empty contract code".into()));
            }
            Operation::ChangeTrust { asset, limit } => {
                if *asset == Asset::Native {
                    return Err(Error::InvalidInput("cannot trust the native asset".into()));
                }
                if *limit < 0 {
                    return Err(Error::InvalidInput(format!("negative trust limit {}", limit)));
                }
            }
            Operation::Payment { amount, .. } if *amount <= 0 => {
                return Err(Error::InvalidInput(format!(
                    "payment amount must be positive, got {}",
                    amount
                )));
            }
            Operation::ExtendFootprint { extend_to } if *extend_to == 0 => {
                return Err(Error::InvalidInput("extend_to must be positive".into()));
            }
            _ => {}
        }
        Ok(())
    }

    pub(crate) fn to_xdr(&self) -> Result<xdr::Operation> {
        let body = match self {
            Operation::Invoke {
                contract,
                function,
                args,
            } => host_function(HostFunction::InvokeContract(InvokeContractArgs {
                contract_address: xdr::contract_address(contract),
                function_name: ScSymbol(function.as_str().try_into()?),
                args: args.clone().try_into()?,
            })),
            Operation::CreateContract {
                preimage,
                executable,
            } => host_function(HostFunction::CreateContract(CreateContractArgs {
                contract_id_preimage: preimage.clone(),
                executable: executable.clone(),
            })),
            Operation::UploadCode { wasm } => {
                host_function(HostFunction::UploadContractWasm(wasm.clone().try_into()?))
            }
            Operation::ChangeTrust { asset, limit } => OperationBody::ChangeTrust(ChangeTrustOp {
                line: trust_line(asset),
                limit: *limit,
            }),
            Operation::Payment {
                destination,
                asset,
                amount,
            } => OperationBody::Payment(PaymentOp {
                destination: MuxedAccount::Ed25519(Uint256(xdr::account_key(destination))),
                asset: asset.clone(),
                amount: *amount,
            }),
            Operation::ExtendFootprint { extend_to } => {
                OperationBody::ExtendFootprintTtl(ExtendFootprintTtlOp {
                    ext: ExtensionPoint::V0,
                    extend_to: *extend_to,
                })
            }
            Operation::RestoreFootprint => OperationBody::RestoreFootprint(RestoreFootprintOp {
                ext: ExtensionPoint::V0,
            }),
        };
        Ok(xdr::Operation {
            source_account: None,
            body,
        })
    }
}

/// Host function call with no authorization entries yet; simulation fills
/// them in.
fn host_function(host_function: HostFunction) -> OperationBody {
    OperationBody::InvokeHostFunction(InvokeHostFunctionOp {
        host_function,
        auth: VecM::default(),
    })
}

fn trust_line(asset: &Asset) -> ChangeTrustAsset {
    match asset {
        Asset::Native => ChangeTrustAsset::Native,
        Asset::CreditAlphanum4(a) => ChangeTrustAsset::CreditAlphanum4(a.clone()),
        Asset::CreditAlphanum12(a) => ChangeTrustAsset::CreditAlphanum12(a.clone()),
    }
}
