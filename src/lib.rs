//! Soroban transaction lifecycle client.
//!
//! Builds, signs, submits and decodes smart-contract transactions against a
//! Soroban JSON-RPC endpoint:
//!
//! ```text
//! EnvelopeBuilder → SigningGateway → Submitter → decode
//! ```
//!
//! Each stage takes an explicit [`ClientContext`] (endpoint, network,
//! account resolver) and returns [`Result`]. [`Lifecycle`] wires the stages
//! together.

pub mod config;
pub mod context;
pub mod decode;
pub mod error;
pub mod lifecycle;
pub mod network;
pub mod observability;
pub mod resilience;
pub mod rpc;
pub mod signing;
pub mod strkey;
pub mod submission;
pub mod transaction;
pub mod xdr;

pub use config::schema::ClientConfig;
pub use context::ClientContext;
pub use decode::{decode, DecodedOutcome};
pub use error::{Error, Result};
pub use lifecycle::{Cancellation, CompletionGuard, ExecuteRequest, Execution, Lifecycle};
pub use network::Network;
pub use signing::{LocalKeypairSigner, SignedEnvelope, SigningGateway, SigningProvider};
pub use submission::{PollPolicy, Submitter, TransactionResult};
pub use transaction::{Account, EnvelopeBuilder, Operation, Timeout, UnsignedEnvelope};
