//! Engine and per-account session orchestration.
//!
//! A [`WalletEngine`] holds the shared collaborators. Each viewed account gets
//! an [`AccountLedgerSession`] which owns its state, pending list and history,
//! and a cancellation token that aborts in-flight fetches when the session is
//! closed or dropped.

use lattice_types::{
    Account, AmountConverter, BlockHash, Clock, DecimalAmount, Denomination, RawAmount,
    SystemClock, Timestamp,
};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::address_book::{apply_label, AddressBook, AddressBookEntry, LabelEdit};
use crate::block::{Blake2bHasher, BlockHasher};
use crate::block_builder::{BlockBuilder, ChangeSigner, SendDraft};
use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::guard::{DestinationStatus, SendIntent, ValidationGuard};
use crate::history::{HistoryEntry, HistoryReconciler};
use crate::ledger::{AccountInfo, Cancellable, LedgerSource};
use crate::pending::{PendingAggregator, PendingEntry};
use crate::representatives::{KnownRepresentative, RepresentativeDirectory};
use crate::search::{search, DEFAULT_SEARCH_LIMIT};

/// An account as the wallet displays it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AccountState {
    pub address: Account,
    pub balance_raw: RawAmount,
    pub pending_raw: RawAmount,
    pub frontier: Option<BlockHash>,
    pub representative: Option<Account>,
    pub opened: bool,
    pub block_count: u64,
}

impl AccountState {
    pub fn unopened(address: Account) -> Self {
        Self {
            address,
            balance_raw: RawAmount::zero(),
            pending_raw: RawAmount::zero(),
            frontier: None,
            representative: None,
            opened: false,
            block_count: 0,
        }
    }

    pub fn from_info(address: Account, info: AccountInfo) -> Self {
        Self {
            address,
            balance_raw: info.balance,
            pending_raw: info.pending,
            frontier: Some(info.frontier),
            representative: info.representative,
            opened: true,
            block_count: info.block_count,
        }
    }

    /// Balance in `denomination`, exact.
    pub fn balance(&self, denomination: Denomination) -> DecimalAmount {
        AmountConverter::from_raw(&self.balance_raw, denomination)
    }

    pub fn pending(&self, denomination: Denomination) -> DecimalAmount {
        AmountConverter::from_raw(&self.pending_raw, denomination)
    }
}

/// Result of a details load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    Loaded,
    /// A refresh arrived during the cooldown and was ignored.
    Skipped,
}

#[derive(Clone)]
pub struct WalletEngine {
    ledger: Arc<dyn LedgerSource>,
    book: Arc<dyn AddressBook>,
    representatives: Arc<RepresentativeDirectory>,
    hasher: Arc<dyn BlockHasher>,
    clock: Arc<dyn Clock>,
    config: WalletConfig,
    root: CancellationToken,
}

impl WalletEngine {
    pub fn new(
        config: WalletConfig,
        ledger: Arc<dyn LedgerSource>,
        book: Arc<dyn AddressBook>,
        representatives: RepresentativeDirectory,
    ) -> Self {
        Self {
            ledger,
            book,
            representatives: Arc::new(representatives),
            hasher: Arc::new(Blake2bHasher),
            clock: Arc::new(SystemClock),
            config,
            root: CancellationToken::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_hasher(mut self, hasher: Arc<dyn BlockHasher>) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn hasher(&self) -> &dyn BlockHasher {
        self.hasher.as_ref()
    }

    pub fn open_session(&self, account: Account) -> AccountLedgerSession {
        AccountLedgerSession {
            token: self.root.child_token(),
            page_size: self.config.history_page_size,
            engine: self.clone(),
            account,
            state: None,
            pending: Vec::new(),
            history: Vec::new(),
            representative_label: None,
            address_book_label: None,
            last_load: None,
        }
    }

    /// Cancel every session opened from this engine.
    pub fn shutdown(&self) {
        self.root.cancel();
    }

    pub fn search_representatives(&self, query: &str) -> Vec<KnownRepresentative> {
        self.representatives.search(query, DEFAULT_SEARCH_LIMIT)
    }

    pub fn search_address_book(&self, query: &str) -> Vec<AddressBookEntry> {
        let entries = self.book.entries();
        search(query, &entries, DEFAULT_SEARCH_LIMIT)
            .into_iter()
            .cloned()
            .collect()
    }
}

pub struct AccountLedgerSession {
    engine: WalletEngine,
    account: Account,
    state: Option<AccountState>,
    pending: Vec<PendingEntry>,
    history: Vec<HistoryEntry>,
    page_size: u32,
    representative_label: Option<String>,
    address_book_label: Option<String>,
    /// Start of the current refresh cooldown.
    last_load: Option<Timestamp>,
    token: CancellationToken,
}

impl AccountLedgerSession {
    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn state(&self) -> Option<&AccountState> {
        self.state.as_ref()
    }

    pub fn pending(&self) -> &[PendingEntry] {
        &self.pending
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn representative_label(&self) -> Option<&str> {
        self.representative_label.as_deref()
    }

    pub fn address_book_label(&self) -> Option<&str> {
        self.address_book_label.as_deref()
    }

    /// Payload for sharing this account's receive address.
    pub fn share_payload(&self) -> String {
        self.account.to_string()
    }

    fn ledger(&self) -> (Arc<dyn LedgerSource>, CancellationToken) {
        (Arc::clone(&self.engine.ledger), self.token.clone())
    }

    /// Reload account state, pending credits and the first history page.
    ///
    /// Every load starts the refresh cooldown; a `refresh` request that lands
    /// inside it is ignored.
    ///
    /// An account the ledger does not know loads as unopened, with zero
    /// pending when nothing is waiting for it. `AccountNotFound` is reserved
    /// for operations that need an existing sender.
    pub async fn load_account_details(
        &mut self,
        refresh: bool,
    ) -> Result<RefreshOutcome, WalletError> {
        let now = self.engine.clock.now();
        let cooldown = self.engine.config.refresh_cooldown_secs;
        if refresh && self.last_load.is_some_and(|at| !at.has_expired(cooldown, now)) {
            tracing::debug!(account = %self.account, "refresh ignored during cooldown");
            return Ok(RefreshOutcome::Skipped);
        }
        self.last_load = Some(now);

        let (ledger, token) = self.ledger();
        let ledger = Cancellable::new(ledger.as_ref(), token);
        let config = &self.engine.config;

        let info = ledger.account_info(&self.account).await?;
        let mut state = match info {
            Some(info) => AccountState::from_info(self.account.clone(), info),
            None => AccountState::unopened(self.account.clone()),
        };

        let mut pending = Vec::new();
        if !state.opened || !state.pending_raw.is_zero() {
            let minimum = config.minimum_receive()?;
            let aggregator =
                PendingAggregator::new(&ledger, self.engine.book.as_ref(), config.pending_count);
            let view = aggregator
                .aggregate(&self.account, minimum.as_ref(), state.opened)
                .await?;
            if let Some(total) = view.bootstrap_pending {
                state.pending_raw = total;
            }
            pending = view.entries;
        }

        let page_size = config.history_page_size;
        let history = HistoryReconciler::new(&ledger, self.engine.book.as_ref())
            .reconcile(&self.account, page_size)
            .await?;

        self.representative_label = state
            .representative
            .as_ref()
            .and_then(|r| self.engine.representatives.label(r));
        self.address_book_label = self.engine.book.account_name(&self.account);
        tracing::info!(
            account = %self.account,
            opened = state.opened,
            pending = pending.len(),
            history = history.len(),
            "account details loaded"
        );
        self.state = Some(state);
        self.pending = pending;
        self.history = history;
        self.page_size = page_size;
        Ok(RefreshOutcome::Loaded)
    }

    /// Grow the page and re-fetch the whole history. `Ok(false)` once the
    /// maximum page size has been reached.
    pub async fn load_more(&mut self) -> Result<bool, WalletError> {
        let max = self.engine.config.max_history_page_size;
        if self.page_size >= max {
            return Ok(false);
        }
        let page_size = self
            .page_size
            .saturating_add(self.engine.config.history_page_step)
            .min(max);

        let (ledger, token) = self.ledger();
        let ledger = Cancellable::new(ledger.as_ref(), token);
        self.history = HistoryReconciler::new(&ledger, self.engine.book.as_ref())
            .reconcile(&self.account, page_size)
            .await?;
        self.page_size = page_size;
        Ok(true)
    }

    /// Check a destination before sending to it.
    pub async fn destination_status(
        &self,
        to: &Account,
    ) -> Result<DestinationStatus, WalletError> {
        let (ledger, token) = self.ledger();
        let ledger = Cancellable::new(ledger.as_ref(), token);
        ValidationGuard::new(&ledger).destination_status(to).await
    }

    /// A send intent for this account's entire loaded balance.
    pub fn max_send_intent(&self, to: Account, denomination: Denomination) -> Option<SendIntent> {
        let state = self.state.as_ref()?;
        Some(SendIntent::max(
            self.account.clone(),
            to,
            &state.balance_raw,
            denomination,
        ))
    }

    pub async fn prepare_send(&self, intent: &SendIntent) -> Result<SendDraft, WalletError> {
        let (ledger, token) = self.ledger();
        let ledger = Cancellable::new(ledger.as_ref(), token);
        BlockBuilder::new(
            &ledger,
            self.engine.hasher.as_ref(),
            self.engine.representatives.as_ref(),
            self.engine.config.default_representative(),
        )
        .build_send(intent)
        .await
    }

    /// Change this account's representative through `signer`, then reload the
    /// account state.
    pub async fn change_representative(
        &mut self,
        target: &str,
        signer: &dyn ChangeSigner,
    ) -> Result<BlockHash, WalletError> {
        let target = Account::from_input(target);
        let frontier = self
            .state
            .as_ref()
            .and_then(|s| s.frontier)
            .ok_or_else(|| WalletError::AccountNotFound(self.account.to_string()))?;

        let (ledger, token) = self.ledger();
        let ledger = Cancellable::new(ledger.as_ref(), token);
        let hash = BlockBuilder::new(
            &ledger,
            self.engine.hasher.as_ref(),
            self.engine.representatives.as_ref(),
            None,
        )
        .change_representative(&self.account, frontier, &target, signer)
        .await?;

        if let Some(info) = ledger.account_info(&self.account).await? {
            self.state = Some(AccountState::from_info(self.account.clone(), info));
        }
        self.representative_label = self.engine.representatives.label(&target);
        Ok(hash)
    }

    /// Save, rename or (with blank input) remove this account's label.
    pub fn save_address_book(&mut self, input: &str) -> Result<LabelEdit, WalletError> {
        let edit = apply_label(self.engine.book.as_ref(), &self.account, input)?;
        self.address_book_label = match &edit {
            LabelEdit::Saved(name) => Some(name.clone()),
            LabelEdit::Removed | LabelEdit::Unchanged => None,
        };
        Ok(edit)
    }

    /// Abort in-flight fetches. Further fetches fail with `Cancelled`.
    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for AccountLedgerSession {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
