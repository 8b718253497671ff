//! Wallet engine for a block-lattice ledger.
//!
//! Provides everything an account view needs short of keys and rendering:
//! - Pending credit aggregation, with balance bootstrap for unopened accounts
//! - History reconciliation with batched source-account resolution
//! - Pre-flight validation of sends
//! - Send block construction and the `nanosign:` offline-signing envelope
//! - Representative changes through an external signer
//! - A JSON-RPC [`NodeClient`] implementing [`LedgerSource`]

pub mod address_book;
pub mod block;
pub mod block_builder;
pub mod config;
pub mod envelope;
pub mod error;
pub mod guard;
pub mod history;
pub mod ledger;
pub mod node_client;
pub mod pending;
pub mod representatives;
pub mod search;
pub mod session;

pub use address_book::{AddressBook, AddressBookEntry, LabelEdit, MemoryAddressBook};
pub use block::{Blake2bHasher, BlockHasher, CandidateBlock, CANONICAL_LEN};
pub use block_builder::{BlockBuilder, ChangeRequest, ChangeSigner, SendDraft, SignerError};
pub use config::WalletConfig;
pub use envelope::{BlockFields, SigningEnvelope, SCHEME};
pub use error::{Notice, Severity, WalletError};
pub use guard::{DestinationStatus, SendIntent, ValidationGuard};
pub use history::{HistoryEntry, HistoryKind, HistoryReconciler};
pub use ledger::{
    AccountInfo, BlockKind, BlockOwner, Cancellable, HistoryRecord, LedgerSource, PendingBlock,
};
pub use node_client::NodeClient;
pub use pending::{PendingAggregator, PendingEntry, PendingView};
pub use representatives::{KnownRepresentative, RepresentativeDirectory, RepresentativePicker};
pub use search::{search, Named, DEFAULT_SEARCH_LIMIT};
pub use session::{AccountLedgerSession, AccountState, RefreshOutcome, WalletEngine};
