//! Fundamental types for the lattice wallet engine.
//!
//! Shared by every crate in the workspace: exact amounts and denominations,
//! accounts, block hashes, public keys and timestamps.

pub mod address;
pub mod amount;
pub mod block;
pub mod error;
pub mod keys;
pub mod time;

pub use address::Account;
pub use amount::{AmountConverter, DecimalAmount, Denomination, RawAmount};
pub use block::BlockHash;
pub use error::TypesError;
pub use keys::PublicKey;
pub use time::{Clock, SystemClock, Timestamp};
