//! The ledger-fetch seam.
//!
//! Everything the engine knows about the chain arrives through [`LedgerSource`].
//! Retries, if any, belong to the implementation; the engine never retries.

use async_trait::async_trait;
use lattice_types::{Account, BlockHash, RawAmount, Timestamp};
use serde::Serialize;
use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::error::WalletError;

/// Account state as reported by the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AccountInfo {
    pub frontier: BlockHash,
    pub representative: Option<Account>,
    pub balance: RawAmount,
    pub pending: RawAmount,
    pub block_count: u64,
}

/// One unreceived credit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PendingBlock {
    pub hash: BlockHash,
    pub source: Account,
    pub amount: RawAmount,
    pub local_timestamp: Option<Timestamp>,
}

/// Block type or state subtype as it appears in raw history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    State,
    Send,
    Receive,
    Open,
    Change,
    Epoch,
    Other(String),
}

impl BlockKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "state" => Self::State,
            "send" => Self::Send,
            "receive" => Self::Receive,
            "open" => Self::Open,
            "change" => Self::Change,
            "epoch" => Self::Epoch,
            other => Self::Other(other.to_string()),
        }
    }
}

/// A raw history record. For state blocks `account` is the chain owner and the
/// counterparty has to be recovered from `link`; for legacy blocks `account`
/// already names the counterparty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistoryRecord {
    pub block_type: BlockKind,
    pub subtype: Option<BlockKind>,
    pub account: Account,
    pub amount: RawAmount,
    pub hash: BlockHash,
    /// 32-byte link field, present on state blocks.
    pub link: Option<BlockHash>,
    pub local_timestamp: Option<Timestamp>,
    pub height: Option<u64>,
}

/// The owning account of a block, from a batched lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BlockOwner {
    pub hash: BlockHash,
    pub block_account: Account,
}

#[async_trait]
pub trait LedgerSource: Send + Sync {
    /// `Ok(None)` when the ledger has no such account (not opened yet).
    async fn account_info(&self, account: &Account) -> Result<Option<AccountInfo>, WalletError>;

    /// Up to `count` pending credits, optionally only those at or above `threshold`.
    async fn pending(
        &self,
        account: &Account,
        count: u32,
        threshold: Option<&RawAmount>,
    ) -> Result<Vec<PendingBlock>, WalletError>;

    /// The newest `count` records of the account's chain, newest first.
    async fn account_history(
        &self,
        account: &Account,
        count: u32,
    ) -> Result<Vec<HistoryRecord>, WalletError>;

    /// Owners of the given blocks. Unknown hashes are simply absent.
    async fn blocks_info(&self, hashes: &[BlockHash]) -> Result<Vec<BlockOwner>, WalletError>;

    /// Raw JSON contents of a block, `Ok(None)` if the ledger does not have it.
    async fn block_info(&self, hash: &BlockHash) -> Result<Option<String>, WalletError>;

    /// Remote checksum validation of an account string.
    async fn validate_account_number(&self, account: &str) -> Result<bool, WalletError>;
}

/// A [`LedgerSource`] whose every fetch gives up once `token` is cancelled.
pub struct Cancellable<'a> {
    inner: &'a dyn LedgerSource,
    token: CancellationToken,
}

impl<'a> Cancellable<'a> {
    pub fn new(inner: &'a dyn LedgerSource, token: CancellationToken) -> Self {
        Self { inner, token }
    }

    async fn run<T>(
        &self,
        fetch: impl Future<Output = Result<T, WalletError>> + Send,
    ) -> Result<T, WalletError> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(WalletError::Cancelled),
            result = fetch => result,
        }
    }
}

#[async_trait]
impl LedgerSource for Cancellable<'_> {
    async fn account_info(&self, account: &Account) -> Result<Option<AccountInfo>, WalletError> {
        self.run(self.inner.account_info(account)).await
    }

    async fn pending(
        &self,
        account: &Account,
        count: u32,
        threshold: Option<&RawAmount>,
    ) -> Result<Vec<PendingBlock>, WalletError> {
        self.run(self.inner.pending(account, count, threshold)).await
    }

    async fn account_history(
        &self,
        account: &Account,
        count: u32,
    ) -> Result<Vec<HistoryRecord>, WalletError> {
        self.run(self.inner.account_history(account, count)).await
    }

    async fn blocks_info(&self, hashes: &[BlockHash]) -> Result<Vec<BlockOwner>, WalletError> {
        self.run(self.inner.blocks_info(hashes)).await
    }

    async fn block_info(&self, hash: &BlockHash) -> Result<Option<String>, WalletError> {
        self.run(self.inner.block_info(hash)).await
    }

    async fn validate_account_number(&self, account: &str) -> Result<bool, WalletError> {
        self.run(self.inner.validate_account_number(account)).await
    }
}
