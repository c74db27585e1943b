//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use soroban_lifecycle::error::{Error, Result};
use soroban_lifecycle::network::Network;
use soroban_lifecycle::rpc::types::{
    hash_to_hex, GetEventsRequest, GetEventsResponse, GetHealthResponse, GetLatestLedgerResponse,
    GetLedgerEntriesResponse, GetNetworkResponse, GetTransactionResponse, GetTransactionStatus,
    LedgerEntryResult, SendTransactionResponse, SendTransactionStatus, SimulateHostFunctionResult,
    SimulateTransactionResponse,
};
use soroban_lifecycle::rpc::RpcEndpoint;
use soroban_lifecycle::signing::{SignRequest, SignerError, SigningProvider};
use soroban_lifecycle::transaction::transaction_hash;
use soroban_lifecycle::xdr::{
    self, AccountEntry, AccountEntryExt, AccountId, ExtensionPoint, Hash, LedgerEntryChanges,
    LedgerEntryData, LedgerFootprint, LedgerKey, Limits, MuxedAccount, ReadXdr, ScVal,
    SequenceNumber, SorobanResources, SorobanTransactionData, SorobanTransactionDataExt,
    SorobanTransactionMetaExt, SorobanTransactionMetaV2, String32, Thresholds, Transaction,
    TransactionEnvelope, TransactionMeta, TransactionMetaV4, TransactionResult, TransactionResultExt,
    TransactionResultResult, Uint256, VecM, WriteXdr,
};
use soroban_lifecycle::LocalKeypairSigner;

pub const LATEST_LEDGER: u32 = 1000;

/// Deterministic keypair for tests.
pub fn keypair(seed: u8) -> LocalKeypairSigner {
    LocalKeypairSigner::from_seed(&[seed; 32])
}

/// Resource fee the default simulation asks for.
pub const SIMULATED_RESOURCE_FEE: i64 = 5000;

/// The v1 transaction inside an envelope.
pub fn tx_of(envelope: &TransactionEnvelope) -> &Transaction {
    match envelope {
        TransactionEnvelope::Tx(v1) => &v1.tx,
        other => panic!("unexpected envelope {}", other.name()),
    }
}

pub fn account_entry(account_id: AccountId, sequence: i64) -> LedgerEntryData {
    LedgerEntryData::Account(AccountEntry {
        account_id,
        balance: 10_000_000,
        seq_num: SequenceNumber(sequence),
        num_sub_entries: 0,
        inflation_dest: None,
        flags: 0,
        home_domain: String32(Default::default()),
        thresholds: Thresholds([1, 0, 0, 0]),
        signers: VecM::default(),
        ext: AccountEntryExt::V0,
    })
}

/// Base64 `TransactionMeta` v4 whose Soroban meta returns `value`.
pub fn meta_xdr(value: ScVal) -> String {
    TransactionMeta::V4(TransactionMetaV4 {
        ext: ExtensionPoint::V0,
        tx_changes_before: LedgerEntryChanges(VecM::default()),
        operations: VecM::default(),
        tx_changes_after: LedgerEntryChanges(VecM::default()),
        soroban_meta: Some(SorobanTransactionMetaV2 {
            ext: SorobanTransactionMetaExt::V0,
            return_value: Some(value),
        }),
        events: VecM::default(),
        diagnostic_events: VecM::default(),
    })
    .to_xdr_base64(Limits::none())
    .unwrap()
}

/// `getTransaction` SUCCESS whose Soroban meta returns `value`.
pub fn success_with_value(ledger: u32, value: ScVal) -> GetTransactionResponse {
    GetTransactionResponse {
        status: GetTransactionStatus::Success,
        ledger: Some(ledger),
        result_meta_xdr: Some(meta_xdr(value)),
        ..GetTransactionResponse::not_found(ledger)
    }
}

/// Base64 `TransactionResult` with the given fee and result.
pub fn result_xdr(fee_charged: i64, result: TransactionResultResult) -> String {
    TransactionResult {
        fee_charged,
        result,
        ext: TransactionResultExt::V0,
    }
    .to_xdr_base64(Limits::none())
    .unwrap()
}

/// `getTransaction` FAILED with `txFAILED` and no operation results.
pub fn failed(ledger: u32) -> GetTransactionResponse {
    GetTransactionResponse {
        status: GetTransactionStatus::Failed,
        ledger: Some(ledger),
        result_xdr: Some(result_xdr(100, TransactionResultResult::TxFailed(VecM::default()))),
        ..GetTransactionResponse::not_found(ledger)
    }
}

/// Resource data with an empty footprint and the given fee.
pub fn soroban_data(resource_fee: i64) -> SorobanTransactionData {
    SorobanTransactionData {
        ext: SorobanTransactionDataExt::V0,
        resources: SorobanResources {
            footprint: LedgerFootprint {
                read_only: VecM::default(),
                read_write: VecM::default(),
            },
            instructions: 1_000_000,
            disk_read_bytes: 0,
            write_bytes: 0,
        },
        resource_fee,
    }
}

/// Successful simulation with the given auth entries.
pub fn simulation(resource_fee: i64, auth: Vec<String>) -> SimulateTransactionResponse {
    SimulateTransactionResponse {
        latest_ledger: LATEST_LEDGER,
        min_resource_fee: Some(resource_fee.to_string()),
        transaction_data: Some(soroban_data(resource_fee).to_xdr_base64(Limits::none()).unwrap()),
        results: Some(vec![SimulateHostFunctionResult {
            auth,
            xdr: ScVal::Void.to_xdr_base64(Limits::none()).unwrap(),
        }]),
        ..Default::default()
    }
}

pub fn not_found() -> GetTransactionResponse {
    GetTransactionResponse::not_found(LATEST_LEDGER)
}

/// Scripted in-memory endpoint.
///
/// Accounts advance their sequence on every accepted submission, like the
/// ledger does. Polls are served from a queue; an empty queue answers
/// NOT_FOUND.
pub struct MockEndpoint {
    network: Network,
    accounts: Mutex<HashMap<AccountId, i64>>,
    send_script: Mutex<VecDeque<(SendTransactionStatus, Option<String>)>>,
    simulation: Mutex<SimulateTransactionResponse>,
    simulate_calls: AtomicU32,
    polls: Mutex<VecDeque<GetTransactionResponse>>,
    submitted: Mutex<Vec<TransactionEnvelope>>,
    calls: AtomicU32,
    send_calls: AtomicU32,
    poll_calls: AtomicU32,
}

impl MockEndpoint {
    pub fn new() -> Self {
        Self {
            network: Network::testnet(),
            accounts: Mutex::new(HashMap::new()),
            send_script: Mutex::new(VecDeque::new()),
            simulation: Mutex::new(simulation(SIMULATED_RESOURCE_FEE, Vec::new())),
            simulate_calls: AtomicU32::new(0),
            polls: Mutex::new(VecDeque::new()),
            submitted: Mutex::new(Vec::new()),
            calls: AtomicU32::new(0),
            send_calls: AtomicU32::new(0),
            poll_calls: AtomicU32::new(0),
        }
    }

    pub fn with_account(self, account: AccountId, sequence: i64) -> Self {
        self.accounts.lock().unwrap().insert(account, sequence);
        self
    }

    /// Queue a `sendTransaction` answer; unscripted sends answer PENDING.
    pub fn with_send(self, status: SendTransactionStatus, error_result_xdr: Option<String>) -> Self {
        self.send_script.lock().unwrap().push_back((status, error_result_xdr));
        self
    }

    /// Answer every `simulateTransaction` with `response`.
    pub fn with_simulation(self, response: SimulateTransactionResponse) -> Self {
        *self.simulation.lock().unwrap() = response;
        self
    }

    pub fn simulate_calls(&self) -> u32 {
        self.simulate_calls.load(Ordering::SeqCst)
    }

    pub fn with_polls(self, polls: Vec<GetTransactionResponse>) -> Self {
        self.polls.lock().unwrap().extend(polls);
        self
    }

    pub fn push_polls(&self, polls: Vec<GetTransactionResponse>) {
        self.polls.lock().unwrap().extend(polls);
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn send_calls(&self) -> u32 {
        self.send_calls.load(Ordering::SeqCst)
    }

    pub fn poll_calls(&self) -> u32 {
        self.poll_calls.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<TransactionEnvelope> {
        self.submitted.lock().unwrap().clone()
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RpcEndpoint for MockEndpoint {
    async fn get_health(&self) -> Result<GetHealthResponse> {
        self.hit();
        Ok(GetHealthResponse {
            status: "healthy".into(),
            latest_ledger: Some(LATEST_LEDGER),
            oldest_ledger: Some(1),
            ledger_retention_window: Some(17280),
        })
    }

    async fn get_network(&self) -> Result<GetNetworkResponse> {
        self.hit();
        Ok(GetNetworkResponse {
            friendbot_url: None,
            passphrase: self.network.passphrase.clone(),
            protocol_version: 21,
        })
    }

    async fn get_latest_ledger(&self) -> Result<GetLatestLedgerResponse> {
        self.hit();
        Ok(GetLatestLedgerResponse {
            id: "00".repeat(32),
            protocol_version: 21,
            sequence: LATEST_LEDGER,
        })
    }

    async fn get_ledger_entries(&self, keys: &[LedgerKey]) -> Result<GetLedgerEntriesResponse> {
        self.hit();
        let accounts = self.accounts.lock().unwrap();
        let entries = keys
            .iter()
            .filter_map(|key| match key {
                LedgerKey::Account(account) => accounts.get(&account.account_id).map(|seq| {
                    let data = account_entry(account.account_id.clone(), *seq);
                    LedgerEntryResult {
                        key: key.to_xdr_base64(Limits::none()).unwrap(),
                        xdr: data.to_xdr_base64(Limits::none()).unwrap(),
                        last_modified_ledger_seq: LATEST_LEDGER - 1,
                        live_until_ledger_seq: None,
                    }
                }),
                _ => None,
            })
            .collect();
        Ok(GetLedgerEntriesResponse {
            entries: Some(entries),
            latest_ledger: LATEST_LEDGER,
        })
    }

    async fn simulate_transaction(
        &self,
        _envelope: &TransactionEnvelope,
    ) -> Result<SimulateTransactionResponse> {
        self.hit();
        self.simulate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.simulation.lock().unwrap().clone())
    }

    async fn send_transaction(&self, envelope: &TransactionEnvelope) -> Result<SendTransactionResponse> {
        self.hit();
        self.send_calls.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().unwrap().push(envelope.clone());

        let (status, error_result_xdr) = self
            .send_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((SendTransactionStatus::Pending, None));

        let tx = tx_of(envelope);
        if status == SendTransactionStatus::Pending {
            let MuxedAccount::Ed25519(Uint256(key)) = &tx.source_account else {
                return Err(Error::Rpc("muxed source not supported".into()));
            };
            if let Some(seq) = self.accounts.lock().unwrap().get_mut(&xdr::account_id(*key)) {
                *seq = tx.seq_num.0;
            }
        }

        Ok(SendTransactionResponse {
            status,
            hash: hash_to_hex(&transaction_hash(&self.network, tx)?),
            latest_ledger: LATEST_LEDGER,
            latest_ledger_close_time: Some("1700000000".into()),
            error_result_xdr,
        })
    }

    async fn get_transaction(&self, _hash: &Hash) -> Result<GetTransactionResponse> {
        self.hit();
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.polls.lock().unwrap().pop_front().unwrap_or_else(not_found))
    }

    async fn get_events(&self, _request: &GetEventsRequest) -> Result<GetEventsResponse> {
        self.hit();
        Err(Error::Rpc("getEvents not scripted".into()))
    }
}

#[derive(Debug, Clone)]
pub enum SignerBehavior {
    Sign,
    Reject(&'static str),
    Unavailable,
    /// Alters the fee before signing.
    Tamper,
}

/// Scripted wallet.
pub struct MockSigner {
    key: LocalKeypairSigner,
    behavior: SignerBehavior,
    calls: AtomicU32,
}

impl MockSigner {
    pub fn new(key: LocalKeypairSigner, behavior: SignerBehavior) -> Self {
        Self {
            key,
            behavior,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SigningProvider for MockSigner {
    async fn sign_transaction(&self, request: SignRequest) -> std::result::Result<String, SignerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            SignerBehavior::Sign => self.key.sign_transaction(request).await,
            SignerBehavior::Reject(reason) => Err(SignerError::Rejected(reason.to_string())),
            SignerBehavior::Unavailable => Err(SignerError::Unavailable("wallet not installed".into())),
            SignerBehavior::Tamper => {
                let envelope = TransactionEnvelope::from_xdr_base64(&request.envelope_xdr, Limits::none())
                    .map_err(|e| SignerError::Rejected(e.to_string()))?;
                let TransactionEnvelope::Tx(mut v1) = envelope else {
                    return Err(SignerError::Rejected("not a v1 envelope".into()));
                };
                v1.tx.fee += 1;
                let network = Network::new("tampered", request.network_passphrase);
                self.key
                    .sign_envelope(TransactionEnvelope::Tx(v1), &network)
                    .and_then(|signed| Ok(signed.to_xdr_base64(Limits::none())?))
                    .map_err(|e| SignerError::Rejected(e.to_string()))
            }
        }
    }
}

/// JSON-RPC method handler: `Ok(result)` or `Err((code, message))`.
pub type RpcHandler = Arc<dyn Fn(&str, &Value) -> std::result::Result<Value, (i64, String)> + Send + Sync>;

/// Box a closure as an [`RpcHandler`].
pub fn rpc_handler<F>(f: F) -> RpcHandler
where
    F: Fn(&str, &Value) -> std::result::Result<Value, (i64, String)> + Send + Sync + 'static,
{
    Arc::new(f)
}

async fn rpc(State(handler): State<RpcHandler>, Json(request): Json<Value>) -> Json<Value> {
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request.get("method").and_then(Value::as_str).unwrap_or_default();
    let params = request.get("params").cloned().unwrap_or(Value::Null);
    Json(match handler(method, &params) {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err((code, message)) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": code, "message": message }
        }),
    })
}

/// Start a mock JSON-RPC server on an ephemeral port.
pub async fn start_rpc_server(handler: RpcHandler) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/", post(rpc)).with_state(handler);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start a server that accepts requests and never answers in time.
pub async fn start_hanging_server(delay: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route(
        "/",
        post(move || async move {
            tokio::time::sleep(delay).await;
            Json(json!({ "jsonrpc": "2.0", "id": "late", "result": null }))
        }),
    );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Address nothing listens on.
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
