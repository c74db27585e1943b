//! Simulation-driven preparation of Soroban envelopes.
//!
//! A host function call cannot be submitted without its footprint, resource
//! fee and authorization entries. The endpoint computes all three by
//! simulating the unsigned envelope; this step copies them in before the
//! envelope goes to the signer.

use crate::context::ClientContext;
use crate::error::{Error, Result};
use crate::transaction::envelope::UnsignedEnvelope;

/// Simulate `envelope` and attach the resulting resources and auth.
///
/// Fails with `SimulationFailed` when the endpoint reports an error, when
/// archived entries must be restored first, or when no transaction data
/// comes back.
pub async fn prepare(ctx: &ClientContext, envelope: UnsignedEnvelope) -> Result<UnsignedEnvelope> {
    let simulation = ctx
        .endpoint
        .simulate_transaction(&envelope.envelope())
        .await?;

    if let Some(error) = simulation.error {
        tracing::warn!(error = %error, "Simulation failed");
        return Err(Error::SimulationFailed(error));
    }
    if let Some(preamble) = &simulation.restore_preamble {
        return Err(Error::SimulationFailed(format!(
            "archived ledger entries must be restored first (restore fee {})",
            preamble.min_resource_fee
        )));
    }

    let data = simulation
        .soroban_data()?
        .ok_or_else(|| Error::SimulationFailed("no transaction data returned".into()))?;
    let auth = simulation.auth()?;

    tracing::debug!(
        resource_fee = data.resource_fee,
        auth_entries = auth.len(),
        latest_ledger = simulation.latest_ledger,
        "Envelope prepared"
    );

    envelope.with_soroban_data(data)?.with_auth(auth)
}
