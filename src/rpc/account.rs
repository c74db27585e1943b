//! Account snapshots read through the RPC endpoint.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::rpc::endpoint::RpcEndpoint;
use crate::strkey;
use crate::transaction::Account;
use crate::xdr::{read_limits, LedgerEntryData, LedgerKey, LedgerKeyAccount, ReadXdr};

/// Resolves an address to its current sequence number.
#[async_trait]
pub trait AccountResolver: Send + Sync {
    async fn get_account(&self, account_id: &str) -> Result<Account>;
}

/// Reads the account ledger entry with `getLedgerEntries`.
#[derive(Clone)]
pub struct RpcAccountResolver {
    endpoint: Arc<dyn RpcEndpoint>,
}

impl RpcAccountResolver {
    pub fn new(endpoint: Arc<dyn RpcEndpoint>) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl AccountResolver for RpcAccountResolver {
    async fn get_account(&self, account_id: &str) -> Result<Account> {
        let id = strkey::decode_account(account_id)?;
        let response = self
            .endpoint
            .get_ledger_entries(&[LedgerKey::Account(LedgerKeyAccount { account_id: id })])
            .await?;

        let entry = response
            .entries
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("account {}", account_id)))?;

        match LedgerEntryData::from_xdr_base64(&entry.xdr, read_limits())? {
            LedgerEntryData::Account(acc) => {
                let sequence = acc.seq_num.0;
                tracing::debug!(account = %account_id, sequence, "Account loaded");
                Ok(Account::new(account_id, sequence))
            }
            _ => Err(Error::Rpc(format!(
                "ledger entry for {} is not an account",
                account_id
            ))),
        }
    }
}
