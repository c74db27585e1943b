//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every section has defaults, so an empty file is a valid testnet config.

use serde::{Deserialize, Serialize};

use crate::network::Network;

/// Root configuration for the lifecycle client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// RPC endpoint settings.
    pub rpc: RpcConfig,

    /// Which network to sign for.
    pub network: NetworkConfig,

    /// Envelope defaults.
    pub transaction: TransactionConfig,

    /// Confirmation polling.
    pub polling: PollingConfig,

    /// Local signing key source.
    pub signer: SignerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// RPC endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Primary JSON-RPC URL.
    pub url: String,

    /// Tried in order when the primary is unreachable.
    pub failover_urls: Vec<String>,

    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "https://soroban-testnet.stellar.org".to_string(),
            failover_urls: Vec::new(),
            timeout_secs: 30,
        }
    }
}

/// Network selection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Preset name (testnet, futurenet, mainnet, standalone) or a custom label.
    pub name: String,

    /// Overrides the preset passphrase. Required for custom names.
    pub passphrase: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            name: "testnet".to_string(),
            passphrase: None,
        }
    }
}

impl NetworkConfig {
    /// Resolve to a concrete network. Unknown names without a passphrase
    /// fall back to testnet; validation reports that case.
    pub fn resolve(&self) -> Network {
        match (&self.passphrase, Network::preset(&self.name)) {
            (Some(passphrase), _) => Network::new(self.name.clone(), passphrase.clone()),
            (None, Some(preset)) => preset,
            (None, None) => Network::testnet(),
        }
    }
}

/// Envelope defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Base fee per operation in stroops.
    pub base_fee: i64,

    /// Upper time bound in seconds from build time; 0 means no upper bound.
    pub timeout_secs: u64,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            base_fee: 100,
            timeout_secs: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    #[default]
    Fixed,
    Exponential,
}

/// Confirmation polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Wait between polls in milliseconds.
    pub interval_ms: u64,

    /// Poll budget; absent means poll until terminal.
    pub max_attempts: Option<u32>,

    pub backoff: BackoffKind,

    /// Cap for exponential backoff in milliseconds.
    pub max_backoff_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_attempts: None,
            backoff: BackoffKind::Fixed,
            max_backoff_ms: 10_000,
        }
    }
}

/// Local signer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SignerConfig {
    /// Environment variable holding the `S…` secret seed.
    pub secret_key_env: String,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            secret_key_env: crate::signing::wallet::SECRET_KEY_ENV_VAR.to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
