//! Envelope construction.
//!
//! # Design Decisions
//! - Building is pure: the account snapshot is borrowed, never mutated,
//!   and wall-clock time comes from an injected `Clock`.
//! - The fee argument is the per-operation base fee; the envelope carries
//!   `fee * operations.len()`.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};
use crate::network::Network;
use crate::strkey;
use crate::transaction::envelope::UnsignedEnvelope;
use crate::transaction::operation::{Operation, OutcomeKind};
use crate::xdr::{
    self, Memo, MuxedAccount, Preconditions, SequenceNumber, TimeBounds, TimePoint, Transaction,
    TransactionExt, Uint256,
};

/// Operations allowed in one transaction.
const MAX_OPERATIONS: usize = 100;

/// Read-only snapshot of a source account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Strkey `G…` address.
    pub account_id: String,
    /// Current on-chain sequence number. The envelope uses `sequence + 1`.
    pub sequence: i64,
}

impl Account {
    pub fn new(account_id: impl Into<String>, sequence: i64) -> Self {
        Self {
            account_id: account_id.into(),
            sequence,
        }
    }
}

/// Transaction validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// No upper time bound.
    #[default]
    Infinite,
    /// Valid until `now + n` seconds.
    Seconds(u64),
}

impl Timeout {
    /// `0` means infinite, matching the config convention.
    pub fn from_secs(secs: u64) -> Self {
        if secs == 0 {
            Timeout::Infinite
        } else {
            Timeout::Seconds(secs)
        }
    }
}

/// Source of unix time for time bounds.
pub trait Clock: Send + Sync {
    fn now_unix_secs(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}

/// Clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_unix_secs(&self) -> u64 {
        self.0
    }
}

/// Assembles unsigned envelopes.
pub struct EnvelopeBuilder<C: Clock = SystemClock> {
    clock: C,
}

impl EnvelopeBuilder<SystemClock> {
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl Default for EnvelopeBuilder<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> EnvelopeBuilder<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Build an unsigned envelope.
    ///
    /// Fails with `InvalidInput` when there are no operations (or more than
    /// 100), the fee is not positive or overflows, the source address is not
    /// an account strkey, a Soroban operation is not alone, or an operation
    /// carries invalid parameters.
    pub fn build(
        &self,
        account: &Account,
        operations: &[Operation],
        fee: i64,
        network: &Network,
        timeout: Timeout,
    ) -> Result<UnsignedEnvelope> {
        if operations.is_empty() {
            return Err(Error::InvalidInput("at least one operation is required".into()));
        }
        if operations.len() > MAX_OPERATIONS {
            return Err(Error::InvalidInput(format!(
                "{} operations exceed the maximum of {}",
                operations.len(),
                MAX_OPERATIONS
            )));
        }
        if fee <= 0 {
            return Err(Error::InvalidInput(format!("fee must be positive, got {}", fee)));
        }
        if operations.len() > 1 && operations.iter().any(Operation::is_soroban) {
            return Err(Error::InvalidInput(
                "a Soroban operation must be the only operation in its transaction".into(),
            ));
        }
        for op in operations {
            op.validate()?;
        }

        let total_fee = fee
            .checked_mul(operations.len() as i64)
            .and_then(|f| u32::try_from(f).ok())
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "fee {} for {} operations overflows",
                    fee,
                    operations.len()
                ))
            })?;

        let source = strkey::decode_account(&account.account_id).map_err(|e| {
            Error::InvalidInput(format!("invalid source account '{}': {}", account.account_id, e))
        })?;
        let seq_num = account
            .sequence
            .checked_add(1)
            .ok_or_else(|| Error::InvalidInput("sequence number overflow".into()))?;

        let max_time = match timeout {
            Timeout::Infinite => 0,
            Timeout::Seconds(secs) => self.clock.now_unix_secs().saturating_add(secs),
        };
        let cond = Preconditions::Time(TimeBounds {
            min_time: TimePoint(0),
            max_time: TimePoint(max_time),
        });

        let expected = match operations {
            [single] => single.expected_outcome(),
            _ => OutcomeKind::Applied,
        };

        let body = operations
            .iter()
            .map(Operation::to_xdr)
            .collect::<Result<Vec<_>>>()?;

        let tx = Transaction {
            source_account: MuxedAccount::Ed25519(Uint256(xdr::account_key(&source))),
            fee: total_fee,
            seq_num: SequenceNumber(seq_num),
            cond,
            memo: Memo::None,
            operations: body.try_into()?,
            ext: TransactionExt::V0,
        };

        tracing::debug!(
            source = %account.account_id,
            seq_num,
            fee = total_fee,
            operations = operations.len(),
            network = %network.name,
            "Envelope built"
        );

        Ok(UnsignedEnvelope::new(tx, network.clone(), expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xdr::{Asset, Hash, Limits, ScVal, WriteXdr};

    fn account() -> Account {
        Account::new(strkey::encode_account(&xdr::account_id([3u8; 32])), 41)
    }

    fn payment() -> Operation {
        Operation::Payment {
            destination: xdr::account_id([9u8; 32]),
            asset: Asset::Native,
            amount: 10_000_000,
        }
    }

    fn builder() -> EnvelopeBuilder<FixedClock> {
        EnvelopeBuilder::with_clock(FixedClock(1_700_000_000))
    }

    #[test]
    fn test_build_is_deterministic() {
        let ops = vec![Operation::Invoke {
            contract: Hash([7; 32]),
            function: "increment".into(),
            args: vec![ScVal::U32(1)],
        }];
        let a = builder()
            .build(&account(), &ops, 100, &Network::testnet(), Timeout::Seconds(30))
            .unwrap();
        let b = builder()
            .build(&account(), &ops, 100, &Network::testnet(), Timeout::Seconds(30))
            .unwrap();
        assert_eq!(
            a.envelope().to_xdr(Limits::none()).unwrap(),
            b.envelope().to_xdr(Limits::none()).unwrap()
        );
        assert_eq!(a.hash().unwrap(), b.hash().unwrap());
    }

    #[test]
    fn test_zero_fee_rejected() {
        let err = builder()
            .build(&account(), &[payment()], 0, &Network::testnet(), Timeout::Infinite)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_empty_operations_rejected() {
        let err = builder()
            .build(&account(), &[], 100, &Network::testnet(), Timeout::Infinite)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_sequence_and_fee_and_bounds() {
        let snapshot = account();
        let env = builder()
            .build(
                &snapshot,
                &[payment(), payment()],
                100,
                &Network::testnet(),
                Timeout::Seconds(60),
            )
            .unwrap();
        let tx = env.transaction();
        assert_eq!(tx.seq_num, SequenceNumber(42));
        assert_eq!(tx.fee, 200);
        assert_eq!(
            tx.cond,
            Preconditions::Time(TimeBounds {
                min_time: TimePoint(0),
                max_time: TimePoint(1_700_000_060)
            })
        );
        assert_eq!(snapshot.sequence, 41);
        assert_eq!(env.expected_outcome(), OutcomeKind::Applied);
    }

    #[test]
    fn test_infinite_timeout_bounds() {
        let env = builder()
            .build(&account(), &[payment()], 100, &Network::testnet(), Timeout::Infinite)
            .unwrap();
        assert_eq!(
            env.transaction().cond,
            Preconditions::Time(TimeBounds {
                min_time: TimePoint(0),
                max_time: TimePoint(0)
            })
        );
    }

    #[test]
    fn test_fee_overflow_rejected() {
        let err = builder()
            .build(
                &account(),
                &[payment(), payment()],
                i64::from(u32::MAX),
                &Network::testnet(),
                Timeout::Infinite,
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_soroban_operation_must_be_alone() {
        let err = builder()
            .build(
                &account(),
                &[payment(), Operation::RestoreFootprint],
                100,
                &Network::testnet(),
                Timeout::Infinite,
            )
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_bad_source_rejected() {
        let bad = Account::new("GNOTANACCOUNT", 1);
        let err = builder()
            .build(&bad, &[payment()], 100, &Network::testnet(), Timeout::Infinite)
            .unwrap_err();
        assert!(err.to_string().contains("invalid source account"));
    }

    #[test]
    fn test_timeout_from_secs() {
        assert_eq!(Timeout::from_secs(0), Timeout::Infinite);
        assert_eq!(Timeout::from_secs(30), Timeout::Seconds(30));
    }
}
