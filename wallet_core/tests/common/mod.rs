#![allow(dead_code)]

use lattice_crypto::encode_account;
use lattice_nullables::{NullClock, NullLedger};
use lattice_types::{Account, BlockHash, PublicKey, RawAmount, Timestamp};
use lattice_wallet_core::{
    AccountInfo, BlockKind, CandidateBlock, HistoryRecord, KnownRepresentative, LedgerSource,
    MemoryAddressBook, PendingBlock, RepresentativeDirectory, WalletConfig, WalletEngine,
};
use std::sync::Arc;

pub const UNIT: u128 = 1_000_000_000_000_000_000_000_000;

pub fn raw(v: u128) -> RawAmount {
    RawAmount::from_u128(v)
}

pub fn account(byte: u8) -> Account {
    encode_account(&PublicKey([byte; 32]))
}

pub fn sender() -> Account {
    account(1)
}

pub fn recipient() -> Account {
    account(7)
}

pub fn representative() -> Account {
    account(3)
}

/// The block at the sender's frontier.
pub fn prior_block(balance: u128) -> CandidateBlock {
    CandidateBlock {
        account: sender(),
        previous: BlockHash::new([2; 32]),
        representative: representative(),
        balance: raw(balance),
        link: BlockHash::new([4; 32]),
    }
}

pub struct Fixture {
    pub ledger: Arc<NullLedger>,
    pub book: Arc<MemoryAddressBook>,
    pub clock: Arc<NullClock>,
    pub engine: WalletEngine,
    pub frontier: BlockHash,
}

/// Sender opened with `balance` raw and a stored frontier block; recipient unknown.
pub fn fixture(balance: u128) -> Fixture {
    fixture_with(balance, WalletConfig::default())
}

pub fn fixture_with(balance: u128, config: WalletConfig) -> Fixture {
    let ledger = Arc::new(NullLedger::new());
    let frontier = ledger.put_state_block(&prior_block(balance)).unwrap();
    ledger.put_account(
        &sender(),
        AccountInfo {
            frontier,
            representative: Some(representative()),
            balance: raw(balance),
            pending: RawAmount::zero(),
            block_count: 2,
        },
    );

    let book = Arc::new(MemoryAddressBook::new());
    let clock = Arc::new(NullClock::new(1_000));
    let directory = RepresentativeDirectory::new(vec![KnownRepresentative {
        account: representative(),
        name: "Rep One".into(),
    }]);
    let engine = WalletEngine::new(
        config,
        ledger.clone() as Arc<dyn LedgerSource>,
        book.clone(),
        directory,
    )
    .with_clock(clock.clone());

    Fixture {
        ledger,
        book,
        clock,
        engine,
        frontier,
    }
}

pub fn pending_block(n: u8, source: &Account, amount: u128) -> PendingBlock {
    PendingBlock {
        hash: BlockHash::new([n; 32]),
        source: source.clone(),
        amount: raw(amount),
        local_timestamp: Some(Timestamp::new(1_600_000_000 + n as u64)),
    }
}

pub fn state_record(subtype: BlockKind, n: u8, link: BlockHash, amount: u128) -> HistoryRecord {
    HistoryRecord {
        block_type: BlockKind::State,
        subtype: Some(subtype),
        account: sender(),
        amount: raw(amount),
        hash: BlockHash::new([n; 32]),
        link: Some(link),
        local_timestamp: None,
        height: None,
    }
}

pub fn legacy_record(kind: BlockKind, n: u8, counterparty: &Account, amount: u128) -> HistoryRecord {
    HistoryRecord {
        block_type: kind,
        subtype: None,
        account: counterparty.clone(),
        amount: raw(amount),
        hash: BlockHash::new([n; 32]),
        link: None,
        local_timestamp: None,
        height: None,
    }
}
