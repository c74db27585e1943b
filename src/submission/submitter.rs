//! Submission and confirmation polling.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;
use std::time::Instant;
use tokio::time::sleep;

use crate::context::ClientContext;
use crate::error::{Error, Result};
use crate::lifecycle::cancellation::Cancellation;
use crate::observability::metrics;
use crate::rpc::types::{hash_to_hex, GetTransactionResponse, GetTransactionStatus, SendTransactionStatus};
use crate::rpc::RpcEndpoint;
use crate::signing::SignedEnvelope;
use crate::submission::cache::ResultCache;
use crate::submission::policy::PollPolicy;
use crate::submission::result::{TransactionResult, TransactionResultSummary};
use crate::submission::state::{transition, SubmissionEvent, SubmissionState};
use crate::transaction::OutcomeKind;
use crate::xdr::Hash;

/// Drives a signed envelope from submission to a terminal status.
#[derive(Clone)]
pub struct Submitter {
    endpoint: Arc<dyn RpcEndpoint>,
    cache: ResultCache,
    cancellation: Option<Cancellation>,
}

impl Submitter {
    pub fn new(endpoint: Arc<dyn RpcEndpoint>) -> Self {
        Self {
            endpoint,
            cache: ResultCache::new(),
            cancellation: None,
        }
    }

    pub fn from_context(ctx: &ClientContext) -> Self {
        Self::new(ctx.endpoint.clone())
    }

    /// Share a result cache with other submitters.
    pub fn with_cache(mut self, cache: ResultCache) -> Self {
        self.cache = cache;
        self
    }

    /// Abandon polling when `cancellation` fires.
    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Submit `signed` and poll until the network reports a terminal status.
    pub async fn submit_and_await(
        &self,
        signed: SignedEnvelope,
        policy: &PollPolicy,
    ) -> Result<TransactionResult> {
        let expected = signed.expected_outcome();
        let hash = self.submit(signed).await?;
        self.await_handle(hash, expected, policy).await
    }

    /// Send `signed` without waiting for confirmation.
    ///
    /// Returns the hash once the endpoint has accepted the envelope for
    /// inclusion.
    pub async fn submit(&self, signed: SignedEnvelope) -> Result<Hash> {
        let hash = signed.hash();
        let response = self.endpoint.send_transaction(signed.envelope()).await?;
        metrics::record_submission(response.status.as_str());

        if !response.hash.eq_ignore_ascii_case(&hash_to_hex(&hash)) {
            tracing::warn!(
                local = %hash_to_hex(&hash),
                remote = %response.hash,
                "Endpoint reported a different transaction hash"
            );
        }

        let event = match response.status {
            SendTransactionStatus::Pending | SendTransactionStatus::Duplicate => {
                SubmissionEvent::Accepted
            }
            SendTransactionStatus::Error | SendTransactionStatus::TryAgainLater => {
                SubmissionEvent::Rejected
            }
        };
        let (state, step) = transition(SubmissionState::Built, event)?;
        tracing::debug!(hash = %hash_to_hex(&hash), from = ?step.from, to = ?step.to, reason = step.reason, "Submission transition");

        if state == SubmissionState::Rejected {
            let result = response
                .error_result_xdr
                .as_deref()
                .and_then(|xdr| match TransactionResultSummary::from_base64(xdr) {
                    Ok(summary) => Some(summary),
                    Err(e) => {
                        tracing::warn!(error = %e, "Could not decode errorResultXdr");
                        None
                    }
                });
            tracing::warn!(
                hash = %hash_to_hex(&hash),
                status = response.status.as_str(),
                "Transaction rejected by endpoint"
            );
            return Err(Error::SubmissionRejected {
                status: response.status.as_str().to_string(),
                hash,
                result,
            });
        }

        tracing::info!(
            hash = %hash_to_hex(&hash),
            status = response.status.as_str(),
            latest_ledger = response.latest_ledger,
            "Transaction submitted"
        );
        Ok(hash)
    }

    /// Poll an already-submitted transaction until it is terminal.
    ///
    /// The first poll is immediate. Terminal results are cached, so awaiting
    /// the same hash again returns without touching the endpoint; the cached
    /// success is handed back with this caller's `expected` outcome.
    pub async fn await_handle(
        &self,
        hash: Hash,
        expected: OutcomeKind,
        policy: &PollPolicy,
    ) -> Result<TransactionResult> {
        if let Some(result) = self.cache.get(&hash) {
            tracing::debug!(hash = %hash_to_hex(&hash), "Serving cached result");
            return Ok(result.with_expected(expected));
        }

        let started = Instant::now();
        let mut state = SubmissionState::Submitted;
        let mut attempts: u32 = 0;

        loop {
            if self.is_cancelled() {
                tracing::info!(hash = %hash_to_hex(&hash), attempts, "Polling cancelled");
                return Err(Error::Cancelled(hash));
            }

            attempts = attempts.saturating_add(1);
            metrics::record_poll_attempt();

            let response = match self.endpoint.get_transaction(&hash).await {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(
                        hash = %hash_to_hex(&hash),
                        attempts,
                        error = %e,
                        "Polling failed; the transaction may still land"
                    );
                    return Err(e);
                }
            };

            let event = match response.status {
                GetTransactionStatus::NotFound => SubmissionEvent::PolledNotFound,
                GetTransactionStatus::Success => SubmissionEvent::PolledSuccess,
                GetTransactionStatus::Failed => SubmissionEvent::PolledFailed,
            };
            let (next, _) = transition(state, event)?;
            state = next;

            if state.is_terminal() {
                let result = terminal_result(hash.clone(), expected, &response)?;
                let elapsed = started.elapsed().as_secs_f64();
                metrics::record_confirmation(result.outcome(), elapsed);
                tracing::info!(
                    hash = %hash_to_hex(&hash),
                    outcome = result.outcome(),
                    ledger = result.ledger(),
                    attempts,
                    "Transaction confirmed"
                );
                return Ok(self.cache.insert(result).with_expected(expected));
            }

            if policy.exhausted(attempts) {
                let (timed_out, _) = transition(state, SubmissionEvent::AttemptsExhausted)?;
                tracing::warn!(
                    hash = %hash_to_hex(&hash),
                    attempts,
                    state = ?timed_out,
                    "Transaction still pending after poll budget"
                );
                return Err(Error::PollingTimeout { hash, attempts });
            }

            let delay = policy.delay(attempts);
            tracing::debug!(hash = %hash_to_hex(&hash), attempts, delay_ms = delay.as_millis() as u64, "Not found yet");
            match &self.cancellation {
                Some(cancellation) => {
                    tokio::select! {
                        _ = sleep(delay) => {}
                        _ = cancellation.cancelled() => {
                            tracing::info!(hash = %hash_to_hex(&hash), attempts, "Polling cancelled");
                            return Err(Error::Cancelled(hash));
                        }
                    }
                }
                None => sleep(delay).await,
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(Cancellation::is_cancelled)
    }
}

impl std::fmt::Debug for Submitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submitter")
            .field("cache", &self.cache)
            .field("cancellable", &self.cancellation.is_some())
            .finish()
    }
}

fn terminal_result(
    hash: Hash,
    expected: OutcomeKind,
    response: &GetTransactionResponse,
) -> Result<TransactionResult> {
    let ledger = response.ledger.unwrap_or(response.latest_ledger);
    match response.status {
        GetTransactionStatus::Success => {
            let meta = match response.result_meta_xdr.as_deref() {
                Some(encoded) => STANDARD
                    .decode(encoded)
                    .map_err(|e| Error::Rpc(format!("resultMetaXdr is not base64: {}", e)))?,
                None => Vec::new(),
            };
            Ok(TransactionResult::Success {
                hash,
                ledger,
                meta,
                expected,
            })
        }
        GetTransactionStatus::Failed => {
            let result = response
                .result_xdr
                .as_deref()
                .map(TransactionResultSummary::from_base64)
                .transpose()?;
            Ok(TransactionResult::Failed {
                hash,
                ledger,
                result,
            })
        }
        GetTransactionStatus::NotFound => Err(Error::shape("terminal status", "NOT_FOUND")),
    }
}
