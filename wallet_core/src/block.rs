//! Candidate state blocks and their canonical encoding.

use lattice_crypto::{decode_account, hash_state_block};
use lattice_types::{Account, BlockHash, PublicKey, RawAmount};
use serde::Serialize;

use crate::error::WalletError;

/// Size of the canonical field tuple: four 32-byte fields plus a 16-byte balance.
pub const CANONICAL_LEN: usize = 32 + 32 + 32 + 16 + 32;

/// An unsigned state block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CandidateBlock {
    pub account: Account,
    /// Frontier of `account` when the block was assembled.
    pub previous: BlockHash,
    pub representative: Account,
    pub balance: RawAmount,
    /// For a send, the recipient's public key.
    pub link: BlockHash,
}

impl CandidateBlock {
    /// `account ‖ previous ‖ representative ‖ balance (u128 BE) ‖ link`.
    pub fn canonical_bytes(&self) -> Result<[u8; CANONICAL_LEN], WalletError> {
        let account = account_key(&self.account, "account")?;
        let representative = account_key(&self.representative, "representative")?;
        let balance = self
            .balance
            .to_be_bytes_128()
            .map_err(|e| WalletError::Encoding(format!("balance: {e}")))?;

        let mut out = [0u8; CANONICAL_LEN];
        out[0..32].copy_from_slice(account.as_bytes());
        out[32..64].copy_from_slice(self.previous.as_bytes());
        out[64..96].copy_from_slice(representative.as_bytes());
        out[96..112].copy_from_slice(&balance);
        out[112..144].copy_from_slice(self.link.as_bytes());
        Ok(out)
    }

    pub fn hash(&self, hasher: &dyn BlockHasher) -> Result<BlockHash, WalletError> {
        Ok(hasher.hash(&self.canonical_bytes()?))
    }
}

fn account_key(account: &Account, field: &str) -> Result<PublicKey, WalletError> {
    decode_account(account.as_str())
        .ok_or_else(|| WalletError::Encoding(format!("{field} {account} is not a valid account")))
}

/// Hash over the canonical field tuple.
pub trait BlockHasher: Send + Sync {
    fn hash(&self, canonical: &[u8; CANONICAL_LEN]) -> BlockHash;
}

/// Blake2b-256 with the state-block preamble.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake2bHasher;

impl BlockHasher for Blake2bHasher {
    fn hash(&self, canonical: &[u8; CANONICAL_LEN]) -> BlockHash {
        hash_state_block(canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lattice_crypto::encode_account;

    fn block() -> CandidateBlock {
        CandidateBlock {
            account: encode_account(&PublicKey([1u8; 32])),
            previous: BlockHash::new([2u8; 32]),
            representative: encode_account(&PublicKey([3u8; 32])),
            balance: RawAmount::from_u128(0x0102),
            link: BlockHash::new([4u8; 32]),
        }
    }

    #[test]
    fn field_layout_is_fixed() {
        let bytes = block().canonical_bytes().unwrap();
        assert!(bytes[0..32].iter().all(|&b| b == 1));
        assert!(bytes[32..64].iter().all(|&b| b == 2));
        assert!(bytes[64..96].iter().all(|&b| b == 3));
        assert!(bytes[96..110].iter().all(|&b| b == 0));
        assert_eq!(&bytes[110..112], &[0x01, 0x02]);
        assert!(bytes[112..144].iter().all(|&b| b == 4));
    }

    #[test]
    fn equal_blocks_hash_equal() {
        let a = block().hash(&Blake2bHasher).unwrap();
        let b = block().hash(&Blake2bHasher).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn balance_change_changes_hash() {
        let mut other = block();
        other.balance = RawAmount::from_u128(0x0103);
        assert_ne!(
            block().hash(&Blake2bHasher).unwrap(),
            other.hash(&Blake2bHasher).unwrap()
        );
    }

    #[test]
    fn undecodable_representative_is_encoding_error() {
        let mut bad = block();
        bad.representative = Account::new("nano_nope");
        assert!(matches!(bad.canonical_bytes(), Err(WalletError::Encoding(_))));
    }

    #[test]
    fn balance_above_u128_is_encoding_error() {
        let mut bad = block();
        bad.balance = RawAmount::from_u128(u128::MAX) + RawAmount::from_u128(1);
        assert!(matches!(bad.canonical_bytes(), Err(WalletError::Encoding(_))));
    }
}
