//! Network identity: passphrase presets and the derived network id.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::xdr::Hash;

pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";
pub const FUTURENET_PASSPHRASE: &str = "Test SDF Future Network ; October 2022";
pub const MAINNET_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";
pub const STANDALONE_PASSPHRASE: &str = "Standalone Network ; February 2017";

/// A named network. Everything signed for it commits to `network_id()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub name: String,
    pub passphrase: String,
}

impl Network {
    pub fn new(name: impl Into<String>, passphrase: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passphrase: passphrase.into(),
        }
    }

    pub fn testnet() -> Self {
        Self::new("testnet", TESTNET_PASSPHRASE)
    }

    pub fn futurenet() -> Self {
        Self::new("futurenet", FUTURENET_PASSPHRASE)
    }

    pub fn mainnet() -> Self {
        Self::new("mainnet", MAINNET_PASSPHRASE)
    }

    pub fn standalone() -> Self {
        Self::new("standalone", STANDALONE_PASSPHRASE)
    }

    /// Look up a preset by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "testnet" => Some(Self::testnet()),
            "futurenet" => Some(Self::futurenet()),
            "mainnet" | "public" => Some(Self::mainnet()),
            "standalone" | "local" => Some(Self::standalone()),
            _ => None,
        }
    }

    /// SHA-256 of the passphrase.
    pub fn network_id(&self) -> Hash {
        Hash(Sha256::digest(self.passphrase.as_bytes()).into())
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::testnet()
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.passphrase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_testnet_network_id() {
        assert_eq!(
            Network::testnet().network_id().to_string(),
            "cee0302d59844d32bdca915c8203dd44b33fbb7edc19051ea37abedf28ecd472"
        );
    }

    #[test]
    fn test_presets_by_name() {
        assert_eq!(Network::preset("Futurenet"), Some(Network::futurenet()));
        assert_eq!(Network::preset("public"), Some(Network::mainnet()));
        assert!(Network::preset("devnet").is_none());
    }

    #[test]
    fn test_distinct_ids() {
        assert_ne!(Network::testnet().network_id(), Network::mainnet().network_id());
    }
}
