//! Poll cadence and budget.

use std::time::Duration;

use crate::config::schema::{BackoffKind, PollingConfig};
use crate::resilience::backoff::calculate_backoff;

/// Spacing between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backoff {
    /// Every wait is `interval`.
    #[default]
    Fixed,
    /// `interval`, doubling per attempt up to `max`, with jitter.
    Exponential { max: Duration },
}

/// How long and how often to poll for a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` polls until a terminal status or cancellation.
    pub max_attempts: Option<u32>,
    pub backoff: Backoff,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            max_attempts: None,
            backoff: Backoff::Fixed,
        }
    }
}

impl PollPolicy {
    pub fn fixed(interval: Duration, max_attempts: Option<u32>) -> Self {
        Self {
            interval,
            max_attempts,
            backoff: Backoff::Fixed,
        }
    }

    pub fn from_config(config: &PollingConfig) -> Self {
        let backoff = match config.backoff {
            BackoffKind::Fixed => Backoff::Fixed,
            BackoffKind::Exponential => Backoff::Exponential {
                max: Duration::from_millis(config.max_backoff_ms),
            },
        };
        Self {
            interval: Duration::from_millis(config.interval_ms),
            max_attempts: config.max_attempts,
            backoff,
        }
    }

    /// Wait after poll number `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.interval,
            Backoff::Exponential { max } => calculate_backoff(attempt, self.interval, max),
        }
    }

    /// Whether `attempts` polls use up the budget.
    pub fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}
