//! Nullable ledger — an in-memory chain view that records every fetch.

use async_trait::async_trait;
use lattice_crypto::validate_account;
use lattice_types::{Account, BlockHash, RawAmount};
use lattice_wallet_core::{
    AccountInfo, Blake2bHasher, BlockFields, BlockOwner, CandidateBlock, HistoryRecord,
    LedgerSource, PendingBlock, WalletError,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// One recorded collaborator call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerCall {
    AccountInfo(Account),
    Pending {
        account: Account,
        count: u32,
        threshold: Option<RawAmount>,
    },
    AccountHistory {
        account: Account,
        count: u32,
    },
    BlocksInfo(Vec<BlockHash>),
    BlockInfo(BlockHash),
    ValidateAccountNumber(String),
}

struct StoredBlock {
    owner: Account,
    contents: String,
}

/// An in-memory ledger for testing.
/// Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullLedger {
    accounts: Mutex<HashMap<Account, AccountInfo>>,
    pending: Mutex<HashMap<Account, Vec<PendingBlock>>>,
    history: Mutex<HashMap<Account, Vec<HistoryRecord>>>,
    blocks: Mutex<HashMap<BlockHash, StoredBlock>>,
    /// Frontier that replaces the stored one after N more `account_info` reads.
    frontier_moves: Mutex<HashMap<Account, (usize, BlockHash)>>,
    calls: Mutex<Vec<LedgerCall>>,
    failure: Mutex<Option<String>>,
    hanging: AtomicBool,
}

impl NullLedger {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
            history: Mutex::new(HashMap::new()),
            blocks: Mutex::new(HashMap::new()),
            frontier_moves: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            hanging: AtomicBool::new(false),
        }
    }

    pub fn put_account(&self, account: &Account, info: AccountInfo) {
        self.accounts.lock().unwrap().insert(account.clone(), info);
    }

    pub fn put_pending(&self, account: &Account, blocks: Vec<PendingBlock>) {
        self.pending.lock().unwrap().insert(account.clone(), blocks);
    }

    /// Records newest first, as the node returns them.
    pub fn put_history(&self, account: &Account, records: Vec<HistoryRecord>) {
        self.history.lock().unwrap().insert(account.clone(), records);
    }

    /// Store a block owned by `owner` with raw JSON `contents`.
    pub fn put_block(&self, hash: BlockHash, owner: &Account, contents: impl Into<String>) {
        self.blocks.lock().unwrap().insert(
            hash,
            StoredBlock {
                owner: owner.clone(),
                contents: contents.into(),
            },
        );
    }

    /// Store a state block under its canonical hash and return that hash.
    pub fn put_state_block(&self, block: &CandidateBlock) -> Result<BlockHash, WalletError> {
        let hash = block.hash(&Blake2bHasher)?;
        let fields = BlockFields::from(block);
        let contents = serde_json::json!({
            "type": "state",
            "account": fields.account,
            "previous": fields.previous,
            "representative": fields.representative,
            "balance": fields.balance,
            "link": fields.link,
            "signature": "0".repeat(128),
            "work": "0000000000000000",
        });
        self.put_block(hash, &block.account, contents.to_string());
        Ok(hash)
    }

    /// After `reads` more `account_info` calls for `account`, its frontier
    /// becomes `frontier`.
    pub fn move_frontier_after(&self, account: &Account, reads: usize, frontier: BlockHash) {
        self.frontier_moves
            .lock()
            .unwrap()
            .insert(account.clone(), (reads, frontier));
    }

    /// What a published change block does to the account.
    pub fn apply_change(&self, account: &Account, representative: &Account, frontier: BlockHash) {
        if let Some(info) = self.accounts.lock().unwrap().get_mut(account) {
            info.representative = Some(representative.clone());
            info.frontier = frontier;
            info.block_count += 1;
        }
    }

    /// Every later fetch fails with a network error carrying `message`.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    /// Every later fetch never completes.
    pub fn hang(&self) {
        self.hanging.store(true, Ordering::SeqCst);
    }

    /// All calls so far (for assertions).
    pub fn calls(&self) -> Vec<LedgerCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Just the batched block lookups.
    pub fn blocks_info_batches(&self) -> Vec<Vec<BlockHash>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                LedgerCall::BlocksInfo(hashes) => Some(hashes),
                _ => None,
            })
            .collect()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    async fn enter(&self, call: LedgerCall) -> Result<(), WalletError> {
        self.calls.lock().unwrap().push(call);
        if self.hanging.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(WalletError::Network(message.clone())),
            None => Ok(()),
        }
    }
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerSource for NullLedger {
    async fn account_info(&self, account: &Account) -> Result<Option<AccountInfo>, WalletError> {
        self.enter(LedgerCall::AccountInfo(account.clone())).await?;
        let mut accounts = self.accounts.lock().unwrap();
        let mut moves = self.frontier_moves.lock().unwrap();
        if let Some((reads, frontier)) = moves.get_mut(account) {
            if *reads == 0 {
                if let Some(info) = accounts.get_mut(account) {
                    info.frontier = *frontier;
                }
                moves.remove(account);
            } else {
                *reads -= 1;
            }
        }
        Ok(accounts.get(account).cloned())
    }

    async fn pending(
        &self,
        account: &Account,
        count: u32,
        threshold: Option<&RawAmount>,
    ) -> Result<Vec<PendingBlock>, WalletError> {
        self.enter(LedgerCall::Pending {
            account: account.clone(),
            count,
            threshold: threshold.cloned(),
        })
        .await?;
        let pending = self.pending.lock().unwrap();
        Ok(pending
            .get(account)
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|b| threshold.map_or(true, |t| &b.amount >= t))
                    .take(count as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn account_history(
        &self,
        account: &Account,
        count: u32,
    ) -> Result<Vec<HistoryRecord>, WalletError> {
        self.enter(LedgerCall::AccountHistory {
            account: account.clone(),
            count,
        })
        .await?;
        let history = self.history.lock().unwrap();
        Ok(history
            .get(account)
            .map(|records| records.iter().take(count as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn blocks_info(&self, hashes: &[BlockHash]) -> Result<Vec<BlockOwner>, WalletError> {
        self.enter(LedgerCall::BlocksInfo(hashes.to_vec())).await?;
        let blocks = self.blocks.lock().unwrap();
        Ok(hashes
            .iter()
            .filter_map(|hash| {
                blocks.get(hash).map(|b| BlockOwner {
                    hash: *hash,
                    block_account: b.owner.clone(),
                })
            })
            .collect())
    }

    async fn block_info(&self, hash: &BlockHash) -> Result<Option<String>, WalletError> {
        self.enter(LedgerCall::BlockInfo(*hash)).await?;
        Ok(self
            .blocks
            .lock()
            .unwrap()
            .get(hash)
            .map(|b| b.contents.clone()))
    }

    async fn validate_account_number(&self, account: &str) -> Result<bool, WalletError> {
        self.enter(LedgerCall::ValidateAccountNumber(account.to_string()))
            .await?;
        Ok(validate_account(account))
    }
}
