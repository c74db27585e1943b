//! Cancellation of in-flight polling loops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Cancellation signal shared by polling loops.
///
/// Cancelling only abandons local waiting; a submitted transaction stays
/// pending on the network regardless.
#[derive(Clone)]
pub struct Cancellation {
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
    /// Latched so late subscribers still observe the signal.
    cancelled: Arc<AtomicBool>,
}

impl Cancellation {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            tx,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Subscribe to the cancellation signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Fire the signal.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let _ = self.tx.send(());
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve once cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.subscribe();
        if self.is_cancelled() {
            return;
        }
        // A closed or lagged channel also means the signal fired.
        let _ = rx.recv().await;
    }

    /// Number of loops currently listening.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Cancellation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cancellation")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
