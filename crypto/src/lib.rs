//! Cryptographic primitives for the lattice wallet engine.
//!
//! - **Blake2b** for state-block hashes and account checksums
//! - Account encoding with `nano_` prefix and base32 alphabet
//!
//! Signing is not here: keys stay with the external signer.

pub mod address;
pub mod hash;

pub use address::{account_from_link, decode_account, encode_account, validate_account};
pub use hash::{blake2b_256, blake2b_256_multi, blake2b_40, hash_state_block, STATE_BLOCK_PREAMBLE};
