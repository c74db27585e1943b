//! Contract code, interface and id helpers.

use sha2::{Digest, Sha256};

use crate::context::ClientContext;
use crate::decode::spec::decode_spec_entries;
use crate::decode::wasm::{custom_section, CONTRACT_SPEC_SECTION};
use crate::error::{Error, Result};
use crate::network::Network;
use crate::xdr::{
    self, read_limits, Asset, ContractDataDurability, ContractExecutable, ContractIdPreimage,
    ContractIdPreimageFromAddress, Hash, HashIdPreimage, HashIdPreimageContractId,
    LedgerEntryData, LedgerFootprint, LedgerKey, LedgerKeyContractCode, LedgerKeyContractData,
    Limits, ReadXdr, ScAddress, ScContractInstance, ScSpecEntry, ScVal, SorobanResources,
    SorobanTransactionData, SorobanTransactionDataExt, Uint256, WriteXdr,
};

/// Ledger key of a contract's instance entry.
pub fn instance_key(contract: &Hash) -> LedgerKey {
    LedgerKey::ContractData(LedgerKeyContractData {
        contract: xdr::contract_address(contract),
        key: ScVal::LedgerKeyContractInstance,
        durability: ContractDataDurability::Persistent,
    })
}

pub fn code_key(wasm_hash: &Hash) -> LedgerKey {
    LedgerKey::ContractCode(LedgerKeyContractCode {
        hash: wasm_hash.clone(),
    })
}

async fn fetch_entry(ctx: &ClientContext, key: LedgerKey, what: String) -> Result<LedgerEntryData> {
    let response = ctx.endpoint.get_ledger_entries(&[key]).await?;
    let entry = response
        .entries
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or(Error::NotFound(what))?;
    Ok(LedgerEntryData::from_xdr_base64(&entry.xdr, read_limits())?)
}

/// Read a contract's instance entry.
pub async fn fetch_contract_instance(ctx: &ClientContext, contract: &Hash) -> Result<ScContractInstance> {
    let what = format!("contract instance {}", contract);
    match fetch_entry(ctx, instance_key(contract), what).await? {
        LedgerEntryData::ContractData(data) => match data.val {
            ScVal::ContractInstance(instance) => Ok(instance),
            other => Err(Error::shape("contract instance", other.name())),
        },
        other => Err(Error::shape("contract data entry", other.name())),
    }
}

/// Read uploaded contract code by its hash.
pub async fn fetch_wasm_by_hash(ctx: &ClientContext, wasm_hash: &Hash) -> Result<Vec<u8>> {
    let what = format!("contract code {}", wasm_hash);
    match fetch_entry(ctx, code_key(wasm_hash), what).await? {
        LedgerEntryData::ContractCode(code) => {
            tracing::debug!(hash = %wasm_hash, size = code.code.len(), "Contract code loaded");
            Ok(code.code.into())
        }
        other => Err(Error::shape("contract code entry", other.name())),
    }
}

/// Resolve a contract to its WASM: instance, then code hash, then code.
pub async fn fetch_contract_wasm(ctx: &ClientContext, contract: &Hash) -> Result<Vec<u8>> {
    let instance = fetch_contract_instance(ctx, contract).await?;
    match instance.executable {
        ContractExecutable::Wasm(hash) => fetch_wasm_by_hash(ctx, &hash).await,
        ContractExecutable::StellarAsset => {
            Err(Error::shape("wasm executable", "built-in asset contract"))
        }
    }
}

/// Fetch and decode a contract's interface.
pub async fn fetch_contract_spec(ctx: &ClientContext, contract: &Hash) -> Result<Vec<ScSpecEntry>> {
    let wasm = fetch_contract_wasm(ctx, contract).await?;
    let section = custom_section(&wasm, CONTRACT_SPEC_SECTION)?.ok_or_else(|| {
        Error::NotFound(format!("{} section in contract {}", CONTRACT_SPEC_SECTION, contract))
    })?;
    let entries = decode_spec_entries(section);
    tracing::info!(contract = %contract, entries = entries.len(), "Contract interface decoded");
    Ok(entries)
}

fn contract_id(network: &Network, preimage: ContractIdPreimage) -> Result<Hash> {
    let preimage = HashIdPreimage::ContractId(HashIdPreimageContractId {
        network_id: network.network_id(),
        contract_id_preimage: preimage,
    });
    Ok(Hash(Sha256::digest(preimage.to_xdr(Limits::none())?).into()))
}

/// Id of the built-in contract wrapping `asset` on `network`.
pub fn contract_id_from_asset(network: &Network, asset: &Asset) -> Result<Hash> {
    contract_id(network, ContractIdPreimage::Asset(asset.clone()))
}

/// Id of a contract deployed by `deployer` with `salt` on `network`.
pub fn contract_id_from_address(network: &Network, deployer: &ScAddress, salt: [u8; 32]) -> Result<Hash> {
    contract_id(
        network,
        ContractIdPreimage::Address(ContractIdPreimageFromAddress {
            address: deployer.clone(),
            salt: Uint256(salt),
        }),
    )
}

fn footprint_data(read_only: Vec<LedgerKey>, read_write: Vec<LedgerKey>) -> Result<SorobanTransactionData> {
    Ok(SorobanTransactionData {
        ext: SorobanTransactionDataExt::V0,
        resources: SorobanResources {
            footprint: LedgerFootprint {
                read_only: read_only.try_into()?,
                read_write: read_write.try_into()?,
            },
            instructions: 0,
            disk_read_bytes: 0,
            write_bytes: 0,
        },
        resource_fee: 0,
    })
}

/// Footprint for restoring a contract's archived code and instance.
///
/// Resources and fee are left at zero for simulation to fill in.
pub fn restore_footprint(contract: &Hash, wasm_hash: &Hash) -> Result<SorobanTransactionData> {
    footprint_data(Vec::new(), vec![code_key(wasm_hash), instance_key(contract)])
}

/// Footprint for extending the TTL of a contract's code and instance.
pub fn extend_footprint(contract: &Hash, wasm_hash: &Hash) -> Result<SorobanTransactionData> {
    footprint_data(vec![code_key(wasm_hash), instance_key(contract)], Vec::new())
}
