//! Error types surfaced by the fallible parts of the crate

use thiserror::Error;

use crate::bonus::OwnerKind;

/// Errors from combining or querying bonus sets
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BonusError {
    #[error("cannot combine {left:?} bonuses with {right:?} bonuses")]
    IncompatibleOwnerKind { left: OwnerKind, right: OwnerKind },
    #[error("unknown stat `{0}`")]
    UnknownStat(String),
}

/// Errors from reading or writing the high score ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("ledger ended after {read} of {expected} records")]
    Truncated { read: usize, expected: usize },
}
