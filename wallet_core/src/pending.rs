//! Pending (unreceived) credit aggregation.

use lattice_types::{
    Account, AmountConverter, BlockHash, DecimalAmount, Denomination, RawAmount, Timestamp,
};
use serde::Serialize;

use crate::address_book::AddressBook;
use crate::error::WalletError;
use crate::ledger::LedgerSource;

/// A labelled pending credit. Rebuilt wholesale on every refresh.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PendingEntry {
    pub source_account: Account,
    pub amount_raw: RawAmount,
    pub observed_at: Option<Timestamp>,
    pub block_hash: BlockHash,
    pub label: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PendingView {
    /// Entries at or above the threshold, in ledger order.
    pub entries: Vec<PendingEntry>,
    /// Sum of every fetched entry. Only set for accounts that are not opened.
    pub bootstrap_pending: Option<RawAmount>,
}

pub struct PendingAggregator<'a> {
    ledger: &'a dyn LedgerSource,
    book: &'a dyn AddressBook,
    count: u32,
}

impl<'a> PendingAggregator<'a> {
    pub fn new(ledger: &'a dyn LedgerSource, book: &'a dyn AddressBook, count: u32) -> Self {
        Self {
            ledger,
            book,
            count,
        }
    }

    /// Fetch pending credits for `account`. `minimum` is in whole units.
    pub async fn aggregate(
        &self,
        account: &Account,
        minimum: Option<&DecimalAmount>,
        opened: bool,
    ) -> Result<PendingView, WalletError> {
        let threshold = minimum.map(|m| AmountConverter::to_raw(m, Denomination::Unit));
        tracing::debug!(
            %account,
            count = self.count,
            threshold = ?threshold.as_ref().map(ToString::to_string),
            "fetching pending"
        );

        let blocks = self
            .ledger
            .pending(account, self.count, threshold.as_ref())
            .await?;

        let bootstrap_pending =
            (!opened).then(|| blocks.iter().map(|b| b.amount.clone()).sum::<RawAmount>());

        let entries = blocks
            .into_iter()
            .filter(|b| threshold.as_ref().map_or(true, |t| &b.amount >= t))
            .map(|b| PendingEntry {
                label: self.book.account_name(&b.source),
                source_account: b.source,
                amount_raw: b.amount,
                observed_at: b.local_timestamp,
                block_hash: b.hash,
            })
            .collect();

        Ok(PendingView {
            entries,
            bootstrap_pending,
        })
    }
}
