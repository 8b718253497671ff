//! Blake2b hashing for blocks and account checksums.

use blake2::digest::consts::{U32, U5};
use blake2::{Blake2b, Digest};
use lattice_types::BlockHash;

type Blake2b256 = Blake2b<U32>;
type Blake2b40 = Blake2b<U5>;

/// Prefix hashed ahead of every state block: 31 zero bytes then the state block type (6).
pub const STATE_BLOCK_PREAMBLE: [u8; 32] = {
    let mut p = [0u8; 32];
    p[31] = 6;
    p
};

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    blake2b_256_multi(&[data])
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// 40-bit Blake2b digest, used as the account checksum.
pub fn blake2b_40(data: &[u8]) -> [u8; 5] {
    let mut hasher = Blake2b40::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 5];
    output.copy_from_slice(&result);
    output
}

/// Hash the canonical field encoding of a state block.
pub fn hash_state_block(canonical_fields: &[u8]) -> BlockHash {
    BlockHash::new(blake2b_256_multi(&[&STATE_BLOCK_PREAMBLE, canonical_fields]))
}
