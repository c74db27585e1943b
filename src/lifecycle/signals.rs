//! OS signal handling for the CLI.
//!
//! Ctrl-C abandons polling; it does not withdraw a submitted transaction.

use crate::lifecycle::cancellation::Cancellation;

/// Fire `cancellation` on the first Ctrl-C.
pub fn cancel_on_ctrl_c(cancellation: Cancellation) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, abandoning polling");
                cancellation.cancel();
            }
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
        }
    })
}
