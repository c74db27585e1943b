//! RPC integration subsystem.
//!
//! # Data Flow
//! ```text
//! RpcConfig (URL, failovers, timeout)
//!     → client.rs (JSON-RPC over HTTP with timeouts and failover)
//!     → endpoint.rs (RpcEndpoint trait used by every component)
//!     → account.rs (sequence number lookups)
//! ```
//!
//! `simulateTransaction` is read-only and shares the failover path of the
//! other queries.
//!
//! # Constraints
//! - Every RPC call has a deadline
//! - `sendTransaction` is never retried against the same URL
//! - Server-side JSON-RPC errors do not trigger failover

pub mod account;
pub mod client;
pub mod endpoint;
pub mod types;

pub use account::{AccountResolver, RpcAccountResolver};
pub use client::JsonRpcClient;
pub use endpoint::RpcEndpoint;
pub use types::{
    GetTransactionResponse, GetTransactionStatus, SendTransactionResponse, SendTransactionStatus,
    SimulateTransactionResponse,
};
