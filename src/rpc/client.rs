//! JSON-RPC client with timeout and failover handling.
//!
//! # Responsibilities
//! - Speak JSON-RPC 2.0 over HTTP to the primary endpoint and failovers
//! - Bound every call with the configured timeout
//! - Map transport, protocol and server errors onto the crate `Error`
//! - Record per-method request metrics

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::timeout;

use crate::config::schema::RpcConfig;
use crate::error::{Error, Result};
use crate::observability::metrics;
use crate::rpc::endpoint::RpcEndpoint;
use crate::rpc::types::{
    hash_to_hex, GetEventsRequest, GetEventsResponse, GetHealthResponse, GetLatestLedgerResponse,
    GetLedgerEntriesResponse, GetNetworkResponse, GetTransactionResponse, SendTransactionResponse,
    SimulateTransactionResponse,
};
use crate::xdr::{Hash, LedgerKey, Limits, TransactionEnvelope, WriteXdr};

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: String,
    method: &'a str,
    #[serde(skip_serializing_if = "Value::is_null")]
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

/// Outcome of one attempt against one URL.
enum Attempt<T> {
    Done(Result<T>),
    /// Transport-level failure; the next URL may be tried.
    Failover(String),
}

/// HTTP JSON-RPC client for the network's RPC server.
#[derive(Clone)]
pub struct JsonRpcClient {
    /// Primary URL followed by failovers.
    urls: Vec<url::Url>,
    http: reqwest::Client,
    timeout_duration: Duration,
    timeout_secs: u64,
}

impl JsonRpcClient {
    /// Create a client from configuration.
    ///
    /// Invalid failover URLs are skipped with a warning; an invalid primary
    /// URL is an error.
    pub fn new(config: &RpcConfig) -> Result<Self> {
        let primary: url::Url = config
            .url
            .parse()
            .map_err(|e| Error::Config(format!("Invalid RPC URL '{}': {}", config.url, e)))?;
        let mut urls = vec![primary];

        for url_str in &config.failover_urls {
            match url_str.parse() {
                Ok(url) => urls.push(url),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL"),
            }
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Rpc(format!("HTTP client init failed: {}", e)))?;

        tracing::debug!(rpc_url = %config.url, failovers = urls.len() - 1, "RPC client initialized");

        Ok(Self {
            urls,
            http,
            timeout_duration: Duration::from_secs(config.timeout_secs),
            timeout_secs: config.timeout_secs,
        })
    }

    /// Invoke `method` and deserialize its `result`.
    pub async fn call<R: DeserializeOwned>(&self, method: &str, params: Value) -> Result<R> {
        let mut last_error = String::from("no RPC URLs configured");

        for (i, url) in self.urls.iter().enumerate() {
            match self.attempt(url, method, &params).await {
                Attempt::Done(result) => {
                    metrics::record_rpc_request(method, if result.is_ok() { "ok" } else { "error" });
                    return result;
                }
                Attempt::Failover(reason) => {
                    tracing::warn!(provider_idx = i, method, error = %reason, "RPC error, trying next provider");
                    last_error = reason;
                }
            }
        }

        metrics::record_rpc_request(method, "unreachable");
        if last_error == "timeout" {
            return Err(Error::RpcTimeout(self.timeout_secs));
        }
        Err(Error::Rpc(format!("All RPC providers failed: {}", last_error)))
    }

    async fn attempt<R: DeserializeOwned>(
        &self,
        url: &url::Url,
        method: &str,
        params: &Value,
    ) -> Attempt<R> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: uuid::Uuid::new_v4().to_string(),
            method,
            params: params.clone(),
        };

        let fut = async {
            let response = self.http.post(url.clone()).json(&request).send().await?;
            let response = response.error_for_status()?;
            response.json::<JsonRpcResponse>().await
        };

        let body = match timeout(self.timeout_duration, fut).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) if e.is_decode() => {
                return Attempt::Done(Err(Error::Rpc(format!("malformed response: {}", e))))
            }
            Ok(Err(e)) => return Attempt::Failover(e.to_string()),
            Err(_) => return Attempt::Failover("timeout".to_string()),
        };

        if let Some(err) = body.error {
            return Attempt::Done(Err(Error::Rpc(format!(
                "{} failed ({}): {}",
                method, err.code, err.message
            ))));
        }

        match body.result {
            Some(result) => Attempt::Done(
                serde_json::from_value(result)
                    .map_err(|e| Error::Rpc(format!("unexpected {} result: {}", method, e))),
            ),
            None => Attempt::Done(Err(Error::Rpc(format!("{} returned no result", method)))),
        }
    }
}

#[async_trait]
impl RpcEndpoint for JsonRpcClient {
    async fn get_health(&self) -> Result<GetHealthResponse> {
        self.call("getHealth", Value::Null).await
    }

    async fn get_network(&self) -> Result<GetNetworkResponse> {
        self.call("getNetwork", Value::Null).await
    }

    async fn get_latest_ledger(&self) -> Result<GetLatestLedgerResponse> {
        self.call("getLatestLedger", Value::Null).await
    }

    async fn get_ledger_entries(&self, keys: &[LedgerKey]) -> Result<GetLedgerEntriesResponse> {
        let keys = keys
            .iter()
            .map(|k| k.to_xdr_base64(Limits::none()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.call("getLedgerEntries", json!({ "keys": keys })).await
    }

    async fn simulate_transaction(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<SimulateTransactionResponse> {
        let transaction = envelope.to_xdr_base64(Limits::none())?;
        self.call("simulateTransaction", json!({ "transaction": transaction }))
            .await
    }

    async fn send_transaction(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<SendTransactionResponse> {
        let transaction = envelope.to_xdr_base64(Limits::none())?;
        self.call("sendTransaction", json!({ "transaction": transaction }))
            .await
    }

    async fn get_transaction(&self, hash: &Hash) -> Result<GetTransactionResponse> {
        self.call("getTransaction", json!({ "hash": hash_to_hex(hash) }))
            .await
    }

    async fn get_events(&self, request: &GetEventsRequest) -> Result<GetEventsResponse> {
        let params = serde_json::to_value(request)
            .map_err(|e| Error::Rpc(format!("cannot encode getEvents request: {}", e)))?;
        self.call("getEvents", params).await
    }
}

impl std::fmt::Debug for JsonRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcClient")
            .field("rpc_url", &self.urls.first().map(|u| u.as_str()))
            .field("failovers", &self.urls.len().saturating_sub(1))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> RpcConfig {
        RpcConfig {
            url: "http://127.0.0.1:1".to_string(),
            failover_urls: Vec::new(),
            timeout_secs: 2,
        }
    }

    #[test]
    fn test_invalid_primary_url_rejected() {
        let mut config = test_config();
        config.url = "not a url".to_string();
        let err = JsonRpcClient::new(&config).unwrap_err();
        assert!(err.to_string().contains("Invalid RPC URL"));
    }

    #[test]
    fn test_invalid_failover_skipped() {
        let mut config = test_config();
        config.failover_urls.push("::bad::".to_string());
        config.failover_urls.push("http://127.0.0.1:2".to_string());
        let client = JsonRpcClient::new(&config).unwrap();
        assert_eq!(client.urls.len(), 2);
    }

    #[tokio::test]
    async fn test_rpc_failover_exhausted() {
        let mut config = test_config();
        config.failover_urls.push("http://127.0.0.1:2".to_string());
        let client = JsonRpcClient::new(&config).unwrap();

        let err = client.get_health().await.unwrap_err();
        assert!(err.to_string().contains("All RPC providers failed"));
        assert!(err.is_retryable());
    }
}
