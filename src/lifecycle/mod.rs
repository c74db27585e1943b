//! End-to-end transaction flow.
//!
//! # Data Flow
//! ```text
//! execute(request):
//!     AccountResolver (fresh snapshot per envelope)
//!     → EnvelopeBuilder (memo / resource data attached before signing)
//!     → prepare (Soroban only: simulate, attach footprint, fee and auth)
//!     → SigningGateway
//!     → Submitter (send, then poll until terminal)
//!     → decode
//! ```
//!
//! Cancellation (cancellation.rs) and Ctrl-C wiring (signals.rs) abandon the
//! polling stage only.

pub mod cancellation;
pub mod signals;

use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::context::ClientContext;
use crate::decode::{decode, DecodedOutcome};
use crate::error::{Error, Result};
use crate::signing::{SigningGateway, SigningProvider};
use crate::submission::{PollPolicy, ResultCache, Submitter};
use crate::transaction::{prepare, Clock, EnvelopeBuilder, Operation, SystemClock, Timeout};
use crate::xdr::{Hash, Memo, SorobanTransactionData};

pub use cancellation::Cancellation;

/// What to run and as whom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteRequest {
    /// `G…` address of the source account and signer.
    pub source: String,
    pub operations: Vec<Operation>,
    /// Base fee per operation in stroops.
    pub fee: i64,
    pub timeout: Timeout,
    pub memo: Option<Memo>,
    /// Starting footprint, e.g. the entries to restore. Simulation
    /// replaces its resources and fee.
    pub soroban_data: Option<SorobanTransactionData>,
    /// Simulate Soroban envelopes before signing. Without it the caller's
    /// `soroban_data` is submitted as-is.
    pub simulate: bool,
}

impl ExecuteRequest {
    pub fn new(source: impl Into<String>, operations: Vec<Operation>) -> Self {
        Self {
            source: source.into(),
            operations,
            fee: 100,
            timeout: Timeout::Infinite,
            memo: None,
            soroban_data: None,
            simulate: true,
        }
    }

    pub fn fee(mut self, fee: i64) -> Self {
        self.fee = fee;
        self
    }

    pub fn timeout(mut self, timeout: Timeout) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn memo(mut self, memo: Memo) -> Self {
        self.memo = Some(memo);
        self
    }

    pub fn soroban_data(mut self, data: SorobanTransactionData) -> Self {
        self.soroban_data = Some(data);
        self
    }

    pub fn simulate(mut self, simulate: bool) -> Self {
        self.simulate = simulate;
        self
    }
}

/// Result of a confirmed, decoded transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub hash: Hash,
    pub ledger: u32,
    pub outcome: DecodedOutcome,
}

/// Logs the end of a flow on every exit path, including early returns and
/// a dropped future.
pub struct CompletionGuard {
    label: &'static str,
    id: Uuid,
    started: Instant,
    state: GuardState,
}

enum GuardState {
    Pending,
    Succeeded(String),
    Failed(String),
}

impl CompletionGuard {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            id: Uuid::new_v4(),
            started: Instant::now(),
            state: GuardState::Pending,
        }
    }

    /// Correlates log lines of one flow.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn succeed(&mut self, detail: impl std::fmt::Display) {
        self.state = GuardState::Succeeded(detail.to_string());
    }

    pub fn fail(&mut self, error: &Error) {
        self.state = GuardState::Failed(error.to_string());
    }

    /// Record the outcome of `result` and pass it through.
    pub fn finish<T>(mut self, result: Result<T>, detail: impl FnOnce(&T) -> String) -> Result<T> {
        match &result {
            Ok(value) => self.succeed(detail(value)),
            Err(e) => self.fail(e),
        }
        result
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        match &self.state {
            GuardState::Succeeded(detail) => {
                tracing::info!(flow = self.label, flow_id = %self.id, elapsed_ms, detail = %detail, "Done")
            }
            GuardState::Failed(error) => {
                tracing::warn!(flow = self.label, flow_id = %self.id, elapsed_ms, error = %error, "Done with error")
            }
            GuardState::Pending => {
                tracing::warn!(flow = self.label, flow_id = %self.id, elapsed_ms, "Abandoned before completion")
            }
        }
    }
}

/// Builder, gateway, submitter and decoder wired to one context.
pub struct Lifecycle<C: Clock = SystemClock> {
    ctx: ClientContext,
    builder: EnvelopeBuilder<C>,
    gateway: SigningGateway,
    submitter: Submitter,
    policy: PollPolicy,
}

impl Lifecycle<SystemClock> {
    pub fn new(ctx: ClientContext, provider: Arc<dyn SigningProvider>) -> Self {
        Self::with_clock(ctx, provider, SystemClock)
    }
}

impl<C: Clock> Lifecycle<C> {
    pub fn with_clock(ctx: ClientContext, provider: Arc<dyn SigningProvider>, clock: C) -> Self {
        let submitter = Submitter::from_context(&ctx);
        Self {
            ctx,
            builder: EnvelopeBuilder::with_clock(clock),
            gateway: SigningGateway::new(provider),
            submitter,
            policy: PollPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.submitter = self.submitter.with_cancellation(cancellation);
        self
    }

    pub fn with_cache(mut self, cache: ResultCache) -> Self {
        self.submitter = self.submitter.with_cache(cache);
        self
    }

    pub fn context(&self) -> &ClientContext {
        &self.ctx
    }

    pub fn submitter(&self) -> &Submitter {
        &self.submitter
    }

    /// Run `request` to a decoded outcome.
    ///
    /// The source account is re-read on every call, so concurrent calls
    /// for different accounts never share a sequence snapshot.
    pub async fn execute(&self, request: ExecuteRequest) -> Result<Execution> {
        let guard = CompletionGuard::new("execute");
        let result = self
            .run(request)
            .instrument(tracing::info_span!("execute", flow_id = %guard.id()))
            .await;
        guard.finish(result, |e| format!("{} in ledger {}", e.hash, e.ledger))
    }

    async fn run(&self, request: ExecuteRequest) -> Result<Execution> {
        let account = self.ctx.accounts.get_account(&request.source).await?;

        let mut envelope = self.builder.build(
            &account,
            &request.operations,
            request.fee,
            &self.ctx.network,
            request.timeout,
        )?;
        if let Some(memo) = request.memo {
            envelope = envelope.with_memo(memo);
        }
        if let Some(data) = request.soroban_data {
            envelope = envelope.with_soroban_data(data)?;
        }
        if request.simulate && envelope.is_soroban() {
            envelope = prepare(&self.ctx, envelope).await?;
        }
        tracing::info!(
            source = %request.source,
            sequence = envelope.transaction().seq_num.0,
            fee = envelope.transaction().fee,
            operations = request.operations.len(),
            "Envelope built"
        );

        let signed = self.gateway.sign(envelope, &request.source, &self.ctx).await?;
        let result = self.submitter.submit_and_await(signed, &self.policy).await?;
        let outcome = decode(&result)?;

        Ok(Execution {
            hash: result.hash(),
            ledger: result.ledger(),
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_finish_passes_result_through() {
        let guard = CompletionGuard::new("test");
        let ok: Result<u32> = guard.finish(Ok(5), |v| v.to_string());
        assert_eq!(ok.unwrap(), 5);

        let guard = CompletionGuard::new("test");
        let err: Result<u32> = guard.finish(Err(Error::InvalidInput("fee".into())), |v| v.to_string());
        assert!(matches!(err, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_request_defaults() {
        let request = ExecuteRequest::new("GA", vec![Operation::RestoreFootprint]).fee(500);
        assert_eq!(request.fee, 500);
        assert_eq!(request.timeout, Timeout::Infinite);
        assert!(request.memo.is_none());
        assert!(request.simulate);
        assert!(!request.simulate(false).simulate);
    }
}
