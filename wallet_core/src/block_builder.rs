//! Send and representative-change block construction.

use async_trait::async_trait;
use lattice_crypto::decode_account;
use lattice_types::{Account, BlockHash, Denomination, RawAmount};
use serde::Serialize;
use thiserror::Error;

use crate::block::{BlockHasher, CandidateBlock};
use crate::envelope::{BlockFields, SigningEnvelope};
use crate::error::WalletError;
use crate::guard::{DestinationStatus, SendIntent, ValidationGuard};
use crate::ledger::LedgerSource;
use crate::representatives::RepresentativePicker;

/// A send block ready for the offline signer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SendDraft {
    pub block: CandidateBlock,
    pub hash: BlockHash,
    pub envelope: SigningEnvelope,
    /// The `nanosign:` transport string.
    pub payload: String,
    pub raw_amount: RawAmount,
    /// Part of the amount below one whole unit.
    pub residual_raw: RawAmount,
    pub destination_status: DestinationStatus,
}

/// What the signer needs to produce a change block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChangeRequest {
    pub account: Account,
    pub frontier: BlockHash,
    pub representative: Account,
}

/// Opaque failure from a signer; the message is shown as-is.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct SignerError(pub String);

/// Hashes, signs and publishes change blocks. May be hardware-backed.
#[async_trait]
pub trait ChangeSigner: Send + Sync {
    /// Returns the hash of the published block.
    async fn sign_change(&self, request: &ChangeRequest) -> Result<BlockHash, SignerError>;
}

pub struct BlockBuilder<'a> {
    ledger: &'a dyn LedgerSource,
    hasher: &'a dyn BlockHasher,
    picker: &'a dyn RepresentativePicker,
    default_representative: Option<Account>,
}

impl<'a> BlockBuilder<'a> {
    pub fn new(
        ledger: &'a dyn LedgerSource,
        hasher: &'a dyn BlockHasher,
        picker: &'a dyn RepresentativePicker,
        default_representative: Option<Account>,
    ) -> Self {
        Self {
            ledger,
            hasher,
            picker,
            default_representative,
        }
    }

    /// Validate `intent`, assemble the send block and wrap it with its
    /// predecessor for offline signing.
    pub async fn build_send(&self, intent: &SendIntent) -> Result<SendDraft, WalletError> {
        let guard = ValidationGuard::new(self.ledger);
        guard.check_parties(intent).await?;

        let sender = self
            .ledger
            .account_info(&intent.from)
            .await?
            .ok_or_else(|| WalletError::AccountNotFound(intent.from.to_string()))?;
        let recipient = self.ledger.account_info(&intent.to).await?;
        let destination_status = DestinationStatus::from_info(recipient.as_ref());

        let raw_amount = intent.raw_amount();
        ValidationGuard::check_amount(&raw_amount, &sender.balance)?;
        let new_balance = sender.balance.checked_sub(&raw_amount).ok_or_else(|| {
            WalletError::InsufficientBalance {
                needed: raw_amount.clone(),
                available: sender.balance.clone(),
            }
        })?;

        let representative = self.choose_representative(sender.representative)?;
        let recipient_key = decode_account(intent.to.as_str())
            .ok_or_else(|| WalletError::InvalidDestination(intent.to.to_string()))?;

        let block = CandidateBlock {
            account: intent.from.clone(),
            previous: sender.frontier,
            representative,
            balance: new_balance,
            link: BlockHash::new(recipient_key.0),
        };

        self.ensure_frontier(&intent.from, &block.previous).await?;
        let hash = block.hash(self.hasher)?;

        let contents = self
            .ledger
            .block_info(&block.previous)
            .await?
            .ok_or_else(|| WalletError::PreviousBlockMissing(block.previous.to_string()))?;
        let envelope = SigningEnvelope::new(&block, BlockFields::from_contents(&contents)?);
        let payload = envelope.to_payload()?;
        let residual_raw = &raw_amount % &Denomination::Unit.scale();

        tracing::info!(
            account = %block.account,
            %hash,
            amount = %raw_amount,
            "send block ready for offline signing"
        );
        Ok(SendDraft {
            block,
            hash,
            envelope,
            payload,
            raw_amount,
            residual_raw,
            destination_status,
        })
    }

    /// Own representative, else the configured default, else a picked one.
    fn choose_representative(&self, current: Option<Account>) -> Result<Account, WalletError> {
        current
            .filter(|r| !r.is_empty())
            .or_else(|| self.default_representative.clone())
            .or_else(|| self.picker.pick())
            .ok_or_else(|| {
                WalletError::InvalidRepresentative("no representative available".into())
            })
    }

    /// The frontier may have moved since it was read; a moved frontier would fork.
    async fn ensure_frontier(
        &self,
        account: &Account,
        expected: &BlockHash,
    ) -> Result<(), WalletError> {
        let current = self
            .ledger
            .account_info(account)
            .await?
            .ok_or_else(|| WalletError::AccountNotFound(account.to_string()))?;
        if &current.frontier != expected {
            tracing::warn!(
                %account,
                %expected,
                actual = %current.frontier,
                "frontier moved during build"
            );
            return Err(WalletError::PreviousBlockMissing(format!(
                "frontier moved from {expected} to {}",
                current.frontier
            )));
        }
        Ok(())
    }

    /// Validate `target` and hand a change request to the signer.
    pub async fn change_representative(
        &self,
        account: &Account,
        frontier: BlockHash,
        target: &Account,
        signer: &dyn ChangeSigner,
    ) -> Result<BlockHash, WalletError> {
        if !self.ledger.validate_account_number(target.as_str()).await? {
            return Err(WalletError::InvalidRepresentative(target.to_string()));
        }
        let request = ChangeRequest {
            account: account.clone(),
            frontier,
            representative: target.clone(),
        };
        let hash = signer
            .sign_change(&request)
            .await
            .map_err(|e| WalletError::SignerFailure(e.0))?;
        tracing::info!(%account, representative = %target, %hash, "representative changed");
        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signer_error_displays_its_message() {
        let err = SignerError("Ledger device locked".into());
        assert_eq!(err.to_string(), "Ledger device locked");
    }
}
