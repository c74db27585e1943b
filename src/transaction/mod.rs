//! Envelope Builder.
//!
//! # Data Flow
//! ```text
//! Account snapshot + [Operation] + fee + Network + Timeout
//!     → builder.rs (validate, assemble Transaction)
//!     → envelope.rs (UnsignedEnvelope: memo / Soroban data, hash, XDR)
//!     → prepare.rs (simulate, attach footprint, resource fee and auth)
//!     → signing gateway
//! ```

pub mod builder;
pub mod envelope;
pub mod operation;
pub mod prepare;

pub use builder::{Account, Clock, EnvelopeBuilder, FixedClock, SystemClock, Timeout};
pub use envelope::{text_memo, transaction_hash, UnsignedEnvelope};
pub use operation::{credit_asset, Operation, OutcomeKind};
pub use prepare::prepare;
