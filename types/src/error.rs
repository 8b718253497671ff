//! Parsing errors for the fundamental types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("invalid hex value: {0}")]
    InvalidHex(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("amount must not be negative")]
    NegativeAmount,

    #[error("amount {0} does not fit in 128 bits")]
    AmountOutOfRange(String),

    #[error("unknown denomination: {0}")]
    UnknownDenomination(String),
}
