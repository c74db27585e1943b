//! JSON-RPC request and response payloads.
//!
//! Field names follow the endpoint's camelCase wire names. Binary values are
//! carried as base64 XDR strings and decoded lazily by the caller.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::xdr::{
    read_limits, Hash, ReadXdr, ScVal, SorobanAuthorizationEntry, SorobanTransactionData,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetHealthResponse {
    pub status: String,
    #[serde(default)]
    pub latest_ledger: Option<u32>,
    #[serde(default)]
    pub oldest_ledger: Option<u32>,
    #[serde(default)]
    pub ledger_retention_window: Option<u32>,
}

impl GetHealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetNetworkResponse {
    #[serde(default)]
    pub friendbot_url: Option<String>,
    pub passphrase: String,
    pub protocol_version: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetLatestLedgerResponse {
    pub id: String,
    pub protocol_version: u32,
    pub sequence: u32,
}

/// One entry of a `getLedgerEntries` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryResult {
    /// Base64 `LedgerKey`.
    pub key: String,
    /// Base64 `LedgerEntryData`.
    pub xdr: String,
    pub last_modified_ledger_seq: u32,
    #[serde(default)]
    pub live_until_ledger_seq: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GetLedgerEntriesResponse {
    #[serde(default)]
    pub entries: Option<Vec<LedgerEntryResult>>,
    pub latest_ledger: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SendTransactionStatus {
    Pending,
    Duplicate,
    TryAgainLater,
    Error,
}

impl SendTransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendTransactionStatus::Pending => "PENDING",
            SendTransactionStatus::Duplicate => "DUPLICATE",
            SendTransactionStatus::TryAgainLater => "TRY_AGAIN_LATER",
            SendTransactionStatus::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTransactionResponse {
    pub status: SendTransactionStatus,
    /// Hex transaction hash.
    pub hash: String,
    pub latest_ledger: u32,
    #[serde(default)]
    pub latest_ledger_close_time: Option<String>,
    /// Base64 `TransactionResult` when `status` is `ERROR`.
    #[serde(default)]
    pub error_result_xdr: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GetTransactionStatus {
    Success,
    NotFound,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTransactionResponse {
    pub status: GetTransactionStatus,
    pub latest_ledger: u32,
    #[serde(default)]
    pub ledger: Option<u32>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub application_order: Option<u32>,
    #[serde(default)]
    pub envelope_xdr: Option<String>,
    #[serde(default)]
    pub result_xdr: Option<String>,
    #[serde(default)]
    pub result_meta_xdr: Option<String>,
}

impl GetTransactionResponse {
    /// Response for a hash the endpoint has not seen (yet).
    pub fn not_found(latest_ledger: u32) -> Self {
        Self {
            status: GetTransactionStatus::NotFound,
            latest_ledger,
            ledger: None,
            created_at: None,
            application_order: None,
            envelope_xdr: None,
            result_xdr: None,
            result_meta_xdr: None,
        }
    }
}

/// Host function outcome of a simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateHostFunctionResult {
    /// Base64 `SorobanAuthorizationEntry` values the invocation requires.
    #[serde(default)]
    pub auth: Vec<String>,
    /// Base64 `ScVal` return value.
    pub xdr: String,
}

/// Present when the footprint touches archived entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestorePreamble {
    pub min_resource_fee: String,
    pub transaction_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SimulateTransactionResponse {
    pub latest_ledger: u32,
    #[serde(default)]
    pub min_resource_fee: Option<String>,
    /// Base64 `SorobanTransactionData`.
    #[serde(default)]
    pub transaction_data: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<SimulateHostFunctionResult>>,
    #[serde(default)]
    pub events: Option<Vec<String>>,
    #[serde(default)]
    pub restore_preamble: Option<RestorePreamble>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SimulateTransactionResponse {
    pub fn soroban_data(&self) -> Result<Option<SorobanTransactionData>> {
        self.transaction_data
            .as_deref()
            .map(|data| SorobanTransactionData::from_xdr_base64(data, read_limits()))
            .transpose()
            .map_err(Error::from)
    }

    /// Authorization entries of the first (only) host function.
    pub fn auth(&self) -> Result<Vec<SorobanAuthorizationEntry>> {
        let Some(first) = self.results.as_ref().and_then(|r| r.first()) else {
            return Ok(Vec::new());
        };
        first
            .auth
            .iter()
            .map(|a| SorobanAuthorizationEntry::from_xdr_base64(a, read_limits()).map_err(Error::from))
            .collect()
    }

    /// Return value the invocation would produce.
    pub fn return_value(&self) -> Result<Option<ScVal>> {
        self.results
            .as_ref()
            .and_then(|r| r.first())
            .map(|first| ScVal::from_xdr_base64(&first.xdr, read_limits()))
            .transpose()
            .map_err(Error::from)
    }
}

/// Filter for `getEvents`; empty vectors match everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventFilter {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contract_ids: Vec<String>,
    /// Each topic filter is a list of base64 `ScVal` segments or `*`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetEventsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_ledger: Option<u32>,
    pub filters: Vec<EventFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInfo {
    #[serde(rename = "type")]
    pub event_type: String,
    pub ledger: u32,
    #[serde(default)]
    pub ledger_closed_at: Option<String>,
    #[serde(default)]
    pub contract_id: Option<String>,
    pub id: String,
    #[serde(default)]
    pub paging_token: Option<String>,
    /// Base64 `ScVal` topics.
    pub topic: Vec<String>,
    /// Base64 `ScVal` payload.
    pub value: String,
    #[serde(default)]
    pub in_successful_contract_call: bool,
}

impl EventInfo {
    pub fn decoded_topics(&self) -> Result<Vec<ScVal>> {
        self.topic
            .iter()
            .map(|t| ScVal::from_xdr_base64(t, read_limits()).map_err(Error::from))
            .collect()
    }

    pub fn decoded_value(&self) -> Result<ScVal> {
        Ok(ScVal::from_xdr_base64(&self.value, read_limits())?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetEventsResponse {
    pub events: Vec<EventInfo>,
    pub latest_ledger: u32,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Hex form of a transaction hash as used on the wire (no `0x`).
pub fn hash_to_hex(hash: &Hash) -> String {
    hash.to_string()
}

/// Parse a wire transaction hash.
pub fn hash_from_hex(s: &str) -> Result<Hash> {
    s.parse::<Hash>()
        .map_err(|e| Error::Rpc(format!("invalid transaction hash '{}': {}", s, e)))
}
