//! Signing subsystem.
//!
//! # Data Flow
//! ```text
//! UnsignedEnvelope
//!     → gateway.rs (SignRequest to SigningProvider, verify response)
//!     → SignedEnvelope (consumed by submission)
//!
//! wallet.rs: LocalKeypairSigner, an in-process SigningProvider
//! ```

pub mod gateway;
pub mod wallet;

pub use gateway::{SignRequest, SignedEnvelope, SignerError, SigningGateway, SigningProvider};
pub use wallet::{LocalKeypairSigner, SECRET_KEY_ENV_VAR};
