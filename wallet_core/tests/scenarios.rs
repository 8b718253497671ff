//! End-to-end account flows against nullable collaborators.

mod common;

use common::*;
use lattice_crypto::account_from_link;
use lattice_nullables::{LedgerCall, NullSigner};
use lattice_types::{Account, BlockHash, DecimalAmount, Denomination, RawAmount};
use lattice_wallet_core::{
    AccountInfo, AddressBook, BlockKind, BlockOwner, DestinationStatus, HistoryKind, LabelEdit,
    LedgerSource, RefreshOutcome, SendIntent, WalletConfig, WalletError,
};

fn send_intent(units: &str) -> SendIntent {
    SendIntent::new(
        sender(),
        recipient(),
        units.parse::<DecimalAmount>().unwrap(),
        Denomination::Unit,
    )
}

#[tokio::test]
async fn sending_two_units_from_five_leaves_three() {
    let fx = fixture(5 * UNIT);
    let session = fx.engine.open_session(sender());

    let draft = session.prepare_send(&send_intent("2")).await.unwrap();

    assert_eq!(draft.raw_amount, raw(2 * UNIT));
    assert_eq!(draft.block.balance, raw(3 * UNIT));
    assert_eq!(draft.block.previous, fx.frontier);
    assert_eq!(draft.block.representative, representative());
    assert_eq!(account_from_link(draft.block.link.as_bytes()), recipient());
    assert!(draft.residual_raw.is_zero());
    assert_eq!(draft.destination_status, DestinationStatus::Unopened);
    assert!(draft.payload.starts_with("nanosign:{\"block\":"));
}

#[tokio::test]
async fn half_a_unit_is_below_the_minimum() {
    let fx = fixture(5 * UNIT);
    let session = fx.engine.open_session(sender());

    let err = session.prepare_send(&send_intent("0.5")).await.unwrap_err();

    match err {
        WalletError::AmountBelowMinimumUnit { raw: amount } => {
            assert_eq!(amount, raw(UNIT / 2));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unopened_account_bootstraps_pending_from_all_entries() {
    let fx = fixture(0);
    let fresh = account(9);
    fx.ledger.put_pending(
        &fresh,
        vec![
            pending_block(11, &sender(), UNIT),
            pending_block(12, &recipient(), 2 * UNIT),
        ],
    );
    let mut session = fx.engine.open_session(fresh.clone());

    session.load_account_details(false).await.unwrap();

    let state = session.state().unwrap();
    assert!(!state.opened);
    assert!(state.balance_raw.is_zero());
    assert_eq!(state.pending_raw, raw(3 * UNIT));
    assert_eq!(session.pending().len(), 2);
    assert_eq!(session.pending()[0].amount_raw, raw(UNIT));
}

#[tokio::test]
async fn history_defers_receives_into_one_batch() {
    let fx = fixture(5 * UNIT);
    let h1 = BlockHash::new([0xA1; 32]);
    let origin = account(5);
    fx.ledger.put_block(h1, &origin, "{}");
    fx.ledger.put_history(
        &sender(),
        vec![
            state_record(BlockKind::Send, 30, BlockHash::new([7; 32]), UNIT),
            state_record(BlockKind::Receive, 31, h1, 2 * UNIT),
            legacy_record(BlockKind::Send, 32, &account(6), UNIT),
        ],
    );
    fx.book.save_address(&origin, "Origin").unwrap();
    let mut session = fx.engine.open_session(sender());

    session.load_account_details(false).await.unwrap();

    assert_eq!(fx.ledger.blocks_info_batches(), vec![vec![h1]]);
    let history = session.history();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].kind, HistoryKind::Send);
    assert_eq!(history[0].linked_account, Some(recipient()));
    assert_eq!(history[1].kind, HistoryKind::Receive);
    assert_eq!(history[1].linked_account, Some(origin));
    assert_eq!(history[1].label.as_deref(), Some("Origin"));
    assert_eq!(history[2].kind, HistoryKind::Legacy);
    assert_eq!(history[2].linked_account, Some(account(6)));
}

#[tokio::test]
async fn unknown_account_without_pending_loads_as_unopened() {
    let fx = fixture(5 * UNIT);
    let stranger = account(8);
    let mut session = fx.engine.open_session(stranger.clone());

    let outcome = session.load_account_details(false).await.unwrap();

    assert_eq!(outcome, RefreshOutcome::Loaded);
    let state = session.state().unwrap();
    assert!(!state.opened);
    assert_eq!(state.address, stranger);
    assert!(state.balance_raw.is_zero());
    assert!(state.pending_raw.is_zero());
    assert!(session.pending().is_empty());
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn opened_account_without_pending_skips_pending_fetch() {
    let fx = fixture(5 * UNIT);
    let mut session = fx.engine.open_session(sender());

    session.load_account_details(false).await.unwrap();

    assert!(!fx
        .ledger
        .calls()
        .iter()
        .any(|c| matches!(c, LedgerCall::Pending { .. })));
    assert_eq!(session.representative_label(), Some("Rep One"));
}

#[tokio::test]
async fn minimum_receive_is_sent_to_the_node_in_raw() {
    let config = WalletConfig {
        minimum_receive: Some("1.5".into()),
        ..WalletConfig::default()
    };
    let fx = fixture_with(0, config);
    let fresh = account(9);
    let mut session = fx.engine.open_session(fresh.clone());

    session.load_account_details(false).await.unwrap();

    assert!(fx.ledger.calls().contains(&LedgerCall::Pending {
        account: fresh,
        count: 50,
        threshold: Some(raw(3 * UNIT / 2)),
    }));
}

#[tokio::test]
async fn refresh_inside_cooldown_is_ignored() {
    let fx = fixture(5 * UNIT);
    let mut session = fx.engine.open_session(sender());

    assert_eq!(session.load_account_details(false).await.unwrap(), RefreshOutcome::Loaded);
    fx.ledger.reset_calls();

    fx.clock.advance(4);
    assert_eq!(session.load_account_details(true).await.unwrap(), RefreshOutcome::Skipped);
    assert!(fx.ledger.calls().is_empty());

    fx.clock.advance(1);
    assert_eq!(session.load_account_details(true).await.unwrap(), RefreshOutcome::Loaded);
}

#[tokio::test]
async fn load_more_grows_page_until_the_cap() {
    let config = WalletConfig {
        history_page_size: 150,
        ..WalletConfig::default()
    };
    let fx = fixture_with(5 * UNIT, config);
    let mut session = fx.engine.open_session(sender());
    session.load_account_details(false).await.unwrap();

    assert!(session.load_more().await.unwrap());
    assert_eq!(session.page_size(), 175);
    assert!(session.load_more().await.unwrap());
    assert_eq!(session.page_size(), 200);
    assert!(!session.load_more().await.unwrap());

    let counts: Vec<u32> = fx
        .ledger
        .calls()
        .into_iter()
        .filter_map(|c| match c {
            LedgerCall::AccountHistory { count, .. } => Some(count),
            _ => None,
        })
        .collect();
    assert_eq!(counts, [150, 175, 200]);

    session.load_account_details(false).await.unwrap();
    assert_eq!(session.page_size(), 150);
}

#[tokio::test]
async fn max_send_empties_the_account_exactly() {
    let balance = 4 * UNIT + 987_654_321;
    let fx = fixture(balance);
    let mut session = fx.engine.open_session(sender());
    session.load_account_details(false).await.unwrap();

    let intent = session.max_send_intent(recipient(), Denomination::Unit).unwrap();
    assert_eq!(intent.amount, DecimalAmount::whole(4));
    assert_eq!(intent.extra_raw, raw(987_654_321));

    let draft = session.prepare_send(&intent).await.unwrap();
    assert!(draft.block.balance.is_zero());
    assert_eq!(draft.residual_raw, raw(987_654_321));
}

#[tokio::test]
async fn unknown_sender_is_account_not_found() {
    let fx = fixture(5 * UNIT);
    let stranger = account(8);
    let session = fx.engine.open_session(stranger.clone());
    let intent = SendIntent::new(stranger, recipient(), DecimalAmount::whole(1), Denomination::Unit);

    let err = session.prepare_send(&intent).await.unwrap_err();
    assert!(matches!(err, WalletError::AccountNotFound(_)));
}

#[tokio::test]
async fn empty_sender_is_missing_parties() {
    let fx = fixture(5 * UNIT);
    let session = fx.engine.open_session(sender());
    let intent = SendIntent::new(
        Account::new(""),
        recipient(),
        DecimalAmount::whole(1),
        Denomination::Unit,
    );

    let err = session.prepare_send(&intent).await.unwrap_err();
    assert!(matches!(err, WalletError::MissingParties));
    assert!(!fx
        .ledger
        .calls()
        .iter()
        .any(|c| matches!(c, LedgerCall::AccountInfo(_))));
}

#[tokio::test]
async fn empty_recipient_fails_the_checksum_before_the_party_check() {
    let fx = fixture(5 * UNIT);
    let session = fx.engine.open_session(sender());
    let intent = SendIntent::new(
        sender(),
        Account::new(""),
        DecimalAmount::whole(1),
        Denomination::Unit,
    );

    let err = session.prepare_send(&intent).await.unwrap_err();
    assert!(matches!(err, WalletError::InvalidDestination(_)));
}

#[tokio::test]
async fn opened_recipient_is_reported() {
    let fx = fixture(5 * UNIT);
    fx.ledger.put_account(
        &recipient(),
        AccountInfo {
            frontier: BlockHash::new([0xEE; 32]),
            representative: None,
            balance: RawAmount::zero(),
            pending: RawAmount::zero(),
            block_count: 1,
        },
    );
    let session = fx.engine.open_session(sender());

    assert_eq!(
        session.destination_status(&recipient()).await.unwrap(),
        DestinationStatus::Opened
    );
    assert_eq!(
        session
            .destination_status(&"nano_notanaccount".into())
            .await
            .unwrap(),
        DestinationStatus::Invalid
    );
}

#[tokio::test]
async fn representative_change_updates_state_and_label() {
    let fx = fixture(5 * UNIT);
    let new_rep = account(4);
    let mut session = fx.engine.open_session(sender());
    session.load_account_details(false).await.unwrap();
    let published = BlockHash::new([0xCC; 32]);
    let signer = NullSigner::succeeding(published).applying_to(fx.ledger.clone());

    let padded = format!(" {} ", new_rep);
    let hash = session.change_representative(&padded, &signer).await.unwrap();

    assert_eq!(hash, published);
    let requests = signer.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].frontier, fx.frontier);
    assert_eq!(requests[0].representative, new_rep);
    let state = session.state().unwrap();
    assert_eq!(state.representative, Some(new_rep));
    assert_eq!(state.frontier, Some(published));
    assert_eq!(session.representative_label(), None);
}

#[tokio::test]
async fn invalid_representative_never_reaches_the_signer() {
    let fx = fixture(5 * UNIT);
    let mut session = fx.engine.open_session(sender());
    session.load_account_details(false).await.unwrap();
    let signer = NullSigner::succeeding(BlockHash::ZERO);

    let err = session
        .change_representative("nano_broken", &signer)
        .await
        .unwrap_err();

    assert!(matches!(err, WalletError::InvalidRepresentative(_)));
    assert!(signer.requests().is_empty());
}

#[tokio::test]
async fn signer_failure_passes_its_message_through() {
    let fx = fixture(5 * UNIT);
    let mut session = fx.engine.open_session(sender());
    session.load_account_details(false).await.unwrap();
    let signer = NullSigner::failing("Ledger device locked");

    let err = session
        .change_representative(representative().as_str(), &signer)
        .await
        .unwrap_err();

    assert_eq!(err.notice().message, "Ledger device locked");
    assert_eq!(session.state().unwrap().frontier, Some(fx.frontier));
}

#[tokio::test]
async fn address_book_label_follows_edits() {
    let fx = fixture(5 * UNIT);
    let mut session = fx.engine.open_session(sender());

    assert_eq!(
        session.save_address_book("  Savings ").unwrap(),
        LabelEdit::Saved("Savings".into())
    );
    assert_eq!(session.address_book_label(), Some("Savings"));
    assert_eq!(fx.engine.search_address_book("sav").len(), 1);

    assert_eq!(session.save_address_book("").unwrap(), LabelEdit::Removed);
    assert_eq!(session.address_book_label(), None);
    assert_eq!(fx.book.account_name(&sender()), None);
}

#[tokio::test]
async fn share_payload_is_the_bare_account() {
    let fx = fixture(0);
    let session = fx.engine.open_session(sender());
    assert_eq!(session.share_payload(), sender().to_string());
}

#[tokio::test]
async fn closing_the_engine_cancels_a_hanging_load() {
    let fx = fixture(5 * UNIT);
    let mut session = fx.engine.open_session(sender());
    fx.ledger.hang();

    let engine = fx.engine.clone();
    let (result, _) = tokio::join!(session.load_account_details(false), async move {
        tokio::task::yield_now().await;
        engine.shutdown();
    });

    assert!(matches!(result, Err(WalletError::Cancelled)));
    assert!(session.is_closed());
}

#[tokio::test]
async fn closed_session_fetches_nothing() {
    let fx = fixture(5 * UNIT);
    let mut session = fx.engine.open_session(sender());
    session.close();

    let err = session.load_account_details(false).await.unwrap_err();
    assert!(matches!(err, WalletError::Cancelled));
}

#[tokio::test]
async fn network_failure_surfaces_as_error_notice() {
    let fx = fixture(5 * UNIT);
    fx.ledger.fail_with("connection refused");
    let mut session = fx.engine.open_session(sender());

    let err = session.load_account_details(false).await.unwrap_err();
    assert!(matches!(err, WalletError::Network(_)));
    assert!(session.state().is_none());
}

#[tokio::test]
async fn unmatched_receive_link_is_tolerated() {
    let fx = fixture(5 * UNIT);
    fx.ledger.put_history(
        &sender(),
        vec![state_record(BlockKind::Open, 40, BlockHash::new([0xDD; 32]), UNIT)],
    );
    let mut session = fx.engine.open_session(sender());

    session.load_account_details(false).await.unwrap();

    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history()[0].kind, HistoryKind::Open);
    assert_eq!(session.history()[0].linked_account, None);
}

#[tokio::test]
async fn ledger_owner_lookup_is_shared_with_direct_callers() {
    let fx = fixture(5 * UNIT);
    let owners: Vec<BlockOwner> = fx.ledger.blocks_info(&[fx.frontier]).await.unwrap();
    assert_eq!(owners[0].block_account, sender());
}
