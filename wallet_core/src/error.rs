use lattice_types::{RawAmount, TypesError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("invalid destination account: {0}")]
    InvalidDestination(String),

    #[error("source and destination accounts are required")]
    MissingParties,

    #[error("amount must be greater than zero")]
    AmountNonPositive,

    #[error("amount of {raw} raw is below one whole unit")]
    AmountBelowMinimumUnit { raw: RawAmount },

    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance {
        needed: RawAmount,
        available: RawAmount,
    },

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("previous block unavailable: {0}")]
    PreviousBlockMissing(String),

    #[error("signer failure: {0}")]
    SignerFailure(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] TypesError),

    #[error("invalid representative: {0}")]
    InvalidRepresentative(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("address book unavailable: {0}")]
    Storage(String),

    #[error("operation cancelled")]
    Cancelled,
}

/// How loudly a failure is presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// The single categorized message shown for a failed operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

impl WalletError {
    /// Map this error to its user-facing category and message.
    pub fn notice(&self) -> Notice {
        match self {
            Self::InvalidDestination(_) => Notice::warning("To account address is not valid"),
            Self::MissingParties => Notice::warning("From and to account are required"),
            Self::AmountNonPositive | Self::InvalidAmount(_) => {
                Notice::warning("Amount is invalid")
            }
            Self::AmountBelowMinimumUnit { .. } => Notice::warning(
                "Transactions for less than 1 unit will be ignored by the node. \
                 Send raw amounts with at least 1 unit.",
            ),
            Self::InvalidRepresentative(_) => Notice::warning("Account ID is not a valid account"),
            Self::InsufficientBalance { .. } => {
                Notice::error("From account does not have enough funds")
            }
            Self::AccountNotFound(_) => Notice::error("From account not found"),
            Self::PreviousBlockMissing(_) => Notice::error("Previous block not found"),
            Self::SignerFailure(msg) => Notice::error(msg.clone()),
            Self::Network(msg) => Notice::error(format!("Unable to reach the node: {msg}")),
            Self::Encoding(msg) | Self::Config(msg) => Notice::error(msg.clone()),
            Self::Storage(_) => Notice::error("Address book could not be updated"),
            Self::Cancelled => Notice::warning("Operation cancelled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failures_are_warnings() {
        for err in [
            WalletError::InvalidDestination("x".into()),
            WalletError::MissingParties,
            WalletError::AmountNonPositive,
            WalletError::AmountBelowMinimumUnit {
                raw: RawAmount::from_u128(1),
            },
        ] {
            assert_eq!(err.notice().severity, Severity::Warning, "{err}");
        }
    }

    #[test]
    fn each_guard_failure_has_a_distinct_message() {
        let messages: Vec<String> = [
            WalletError::InvalidDestination("x".into()),
            WalletError::MissingParties,
            WalletError::AmountNonPositive,
            WalletError::AmountBelowMinimumUnit {
                raw: RawAmount::from_u128(1),
            },
            WalletError::InsufficientBalance {
                needed: RawAmount::from_u128(2),
                available: RawAmount::from_u128(1),
            },
        ]
        .iter()
        .map(|e| e.notice().message)
        .collect();
        let mut unique = messages.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), messages.len());
    }

    #[test]
    fn signer_message_passes_through() {
        let notice = WalletError::SignerFailure("device locked".into()).notice();
        assert_eq!(notice.severity, Severity::Error);
        assert_eq!(notice.message, "device locked");
    }
}
