//! The RPC endpoint seam.

use async_trait::async_trait;

use crate::error::Result;
use crate::rpc::types::{
    GetEventsRequest, GetEventsResponse, GetHealthResponse, GetLatestLedgerResponse,
    GetLedgerEntriesResponse, GetNetworkResponse, GetTransactionResponse, SendTransactionResponse,
    SimulateTransactionResponse,
};
use crate::xdr::{Hash, LedgerKey, TransactionEnvelope};

/// Methods of the network's JSON-RPC interface used by the lifecycle.
///
/// Implementations must not retry `send_transaction` on their own; a
/// resubmission with a consumed sequence number always fails.
#[async_trait]
pub trait RpcEndpoint: Send + Sync {
    async fn get_health(&self) -> Result<GetHealthResponse>;

    async fn get_network(&self) -> Result<GetNetworkResponse>;

    async fn get_latest_ledger(&self) -> Result<GetLatestLedgerResponse>;

    async fn get_ledger_entries(&self, keys: &[LedgerKey]) -> Result<GetLedgerEntriesResponse>;

    /// Dry-run an unsigned envelope to learn its footprint, resource fee
    /// and required authorization.
    async fn simulate_transaction(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<SimulateTransactionResponse>;

    async fn send_transaction(&self, envelope: &TransactionEnvelope)
        -> Result<SendTransactionResponse>;

    async fn get_transaction(&self, hash: &Hash) -> Result<GetTransactionResponse>;

    async fn get_events(&self, request: &GetEventsRequest) -> Result<GetEventsResponse>;
}
