//! History reconciliation.
//!
//! State blocks only carry a 32-byte `link`. For sends the link is the
//! recipient's public key and decodes straight to an account. For receives and
//! opens it is the hash of the source send block, whose owner has to be looked
//! up. Those lookups are batched into a single `blocks_info` call after the
//! first pass.

use lattice_crypto::account_from_link;
use lattice_types::{Account, BlockHash, RawAmount, Timestamp};
use serde::Serialize;

use crate::address_book::AddressBook;
use crate::error::WalletError;
use crate::ledger::{BlockKind, HistoryRecord, LedgerSource};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Send,
    Receive,
    Open,
    Epoch,
    /// A pre-state block; `account` is already the counterparty.
    Legacy,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub kind: HistoryKind,
    /// Block type as delivered, e.g. `send` for a legacy send.
    pub block_type: BlockKind,
    pub account: Account,
    pub amount_raw: RawAmount,
    pub block_hash: BlockHash,
    pub linked_account: Option<Account>,
    pub label: Option<String>,
    pub local_timestamp: Option<Timestamp>,
}

enum Classified {
    Drop,
    Resolved(HistoryEntry),
    Deferred(HistoryEntry, BlockHash),
}

pub struct HistoryReconciler<'a> {
    ledger: &'a dyn LedgerSource,
    book: &'a dyn AddressBook,
}

impl<'a> HistoryReconciler<'a> {
    pub fn new(ledger: &'a dyn LedgerSource, book: &'a dyn AddressBook) -> Self {
        Self { ledger, book }
    }

    /// Fetch `page_size` records for `account` and turn them into display
    /// entries, newest first.
    pub async fn reconcile(
        &self,
        account: &Account,
        page_size: u32,
    ) -> Result<Vec<HistoryEntry>, WalletError> {
        tracing::debug!(%account, page_size, "fetching history");
        let records = self.ledger.account_history(account, page_size).await?;

        let mut entries = Vec::with_capacity(records.len());
        let mut deferred: Vec<(usize, BlockHash)> = Vec::new();
        for record in records {
            match self.classify(record) {
                Classified::Drop => {}
                Classified::Resolved(entry) => entries.push(entry),
                Classified::Deferred(entry, link) => {
                    deferred.push((entries.len(), link));
                    entries.push(entry);
                }
            }
        }

        if !deferred.is_empty() {
            self.resolve_deferred(&mut entries, &deferred).await?;
        }
        Ok(entries)
    }

    fn classify(&self, record: HistoryRecord) -> Classified {
        if record.block_type == BlockKind::Change || record.subtype == Some(BlockKind::Change) {
            return Classified::Drop;
        }

        let mut entry = HistoryEntry {
            kind: HistoryKind::Legacy,
            block_type: record.block_type.clone(),
            account: record.account,
            amount_raw: record.amount,
            block_hash: record.hash,
            linked_account: None,
            label: None,
            local_timestamp: record.local_timestamp,
        };

        if record.block_type != BlockKind::State {
            entry.label = self.book.account_name(&entry.account);
            entry.linked_account = Some(entry.account.clone());
            return Classified::Resolved(entry);
        }

        entry.kind = match record.subtype {
            Some(BlockKind::Open) => HistoryKind::Open,
            Some(BlockKind::Receive) => HistoryKind::Receive,
            Some(BlockKind::Send) => HistoryKind::Send,
            Some(BlockKind::Epoch) => HistoryKind::Epoch,
            _ => HistoryKind::Legacy,
        };

        match (entry.kind, record.link) {
            (HistoryKind::Open | HistoryKind::Receive, Some(link)) => {
                Classified::Deferred(entry, link)
            }
            (_, Some(link)) => {
                let linked = account_from_link(link.as_bytes());
                entry.label = self.book.account_name(&linked);
                entry.linked_account = Some(linked);
                Classified::Resolved(entry)
            }
            (_, None) => Classified::Resolved(entry),
        }
    }

    async fn resolve_deferred(
        &self,
        entries: &mut [HistoryEntry],
        deferred: &[(usize, BlockHash)],
    ) -> Result<(), WalletError> {
        let mut links: Vec<BlockHash> = Vec::with_capacity(deferred.len());
        for (_, link) in deferred {
            if !links.contains(link) {
                links.push(*link);
            }
        }

        tracing::debug!(count = links.len(), "resolving source blocks");
        let owners = self.ledger.blocks_info(&links).await?;

        for (index, link) in deferred {
            let Some(owner) = owners.iter().find(|o| &o.hash == link) else {
                tracing::warn!(%link, "source block not found, leaving origin unresolved");
                continue;
            };
            let entry = &mut entries[*index];
            entry.label = self.book.account_name(&owner.block_account);
            entry.linked_account = Some(owner.block_account.clone());
        }
        Ok(())
    }
}
