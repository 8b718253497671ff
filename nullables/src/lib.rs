//! Nullable collaborators for deterministic testing.
//!
//! Every external dependency of the wallet engine (ledger, signer, clock,
//! representative pick policy) sits behind a trait. This crate provides
//! test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Record what was asked of them
//! - Never touch the network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod ledger;
pub mod picker;
pub mod signer;

pub use clock::NullClock;
pub use ledger::{LedgerCall, NullLedger};
pub use picker::NullPicker;
pub use signer::NullSigner;
