//! Pre-flight checks for send blocks.
//!
//! Checks run in a fixed order and the first failure wins:
//! destination checksum, both parties present, amount positive, amount of at
//! least one whole unit, balance sufficient.

use lattice_types::{Account, AmountConverter, DecimalAmount, Denomination, RawAmount};
use serde::Serialize;

use crate::error::WalletError;
use crate::ledger::{AccountInfo, LedgerSource};

/// A user's request to send funds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendIntent {
    pub from: Account,
    pub to: Account,
    pub amount: DecimalAmount,
    pub denomination: Denomination,
    /// Sub-unit raw carried alongside `amount`.
    pub extra_raw: RawAmount,
}

impl SendIntent {
    pub fn new(
        from: Account,
        to: Account,
        amount: DecimalAmount,
        denomination: Denomination,
    ) -> Self {
        Self {
            from,
            to,
            amount,
            denomination,
            extra_raw: RawAmount::zero(),
        }
    }

    /// Send the whole balance: whole units in `denomination` plus the raw residual.
    pub fn max(
        from: Account,
        to: Account,
        balance: &RawAmount,
        denomination: Denomination,
    ) -> Self {
        let (amount, extra_raw) = AmountConverter::split(balance, denomination);
        Self {
            from,
            to,
            amount,
            denomination,
            extra_raw,
        }
    }

    pub fn raw_amount(&self) -> RawAmount {
        AmountConverter::to_raw(&self.amount, self.denomination) + &self.extra_raw
    }
}

/// What the ledger knows about a destination.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationStatus {
    Invalid,
    Unopened,
    Opened,
}

impl DestinationStatus {
    pub fn from_info(info: Option<&AccountInfo>) -> Self {
        match info {
            Some(_) => Self::Opened,
            None => Self::Unopened,
        }
    }
}

pub struct ValidationGuard<'a> {
    ledger: &'a dyn LedgerSource,
}

impl<'a> ValidationGuard<'a> {
    pub fn new(ledger: &'a dyn LedgerSource) -> Self {
        Self { ledger }
    }

    /// Destination checksum, then presence of both parties. The only checks
    /// that touch the network.
    pub async fn check_parties(&self, intent: &SendIntent) -> Result<(), WalletError> {
        if !self.ledger.validate_account_number(intent.to.as_str()).await? {
            return Err(WalletError::InvalidDestination(intent.to.to_string()));
        }
        if intent.from.is_empty() || intent.to.is_empty() {
            return Err(WalletError::MissingParties);
        }
        Ok(())
    }

    /// Amount positive, at least one whole unit, covered by `balance`.
    pub fn check_amount(raw: &RawAmount, balance: &RawAmount) -> Result<(), WalletError> {
        if raw.is_zero() {
            return Err(WalletError::AmountNonPositive);
        }
        if raw < &Denomination::Unit.scale() {
            return Err(WalletError::AmountBelowMinimumUnit { raw: raw.clone() });
        }
        if balance.checked_sub(raw).is_none() {
            return Err(WalletError::InsufficientBalance {
                needed: raw.clone(),
                available: balance.clone(),
            });
        }
        Ok(())
    }

    /// Every check against a known sender balance. Returns the raw amount.
    pub async fn validate(
        &self,
        intent: &SendIntent,
        balance: &RawAmount,
    ) -> Result<RawAmount, WalletError> {
        self.check_parties(intent).await?;
        let raw = intent.raw_amount();
        Self::check_amount(&raw, balance)?;
        Ok(raw)
    }

    pub async fn destination_status(
        &self,
        account: &Account,
    ) -> Result<DestinationStatus, WalletError> {
        if !self.ledger.validate_account_number(account.as_str()).await? {
            return Ok(DestinationStatus::Invalid);
        }
        let info = self.ledger.account_info(account).await?;
        Ok(DestinationStatus::from_info(info.as_ref()))
    }
}
