//! The `nanosign:` offline-signing envelope.
//!
//! The payload carries the new block and its predecessor so that an air-gapped
//! signer can recompute the predecessor's hash, compare it to `block.previous`
//! and only then sign. Key order inside both objects is fixed.

use lattice_types::{Account, BlockHash, RawAmount};
use serde::{Deserialize, Serialize};

use crate::block::{BlockHasher, CandidateBlock};
use crate::error::WalletError;

pub const SCHEME: &str = "nanosign:";

/// The five hashed fields of a state block, in transport form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockFields {
    pub account: String,
    pub previous: String,
    pub representative: String,
    /// Decimal raw.
    pub balance: String,
    /// Uppercase hex.
    pub link: String,
}

impl From<&CandidateBlock> for BlockFields {
    fn from(block: &CandidateBlock) -> Self {
        Self {
            account: block.account.to_string(),
            previous: block.previous.to_string(),
            representative: block.representative.to_string(),
            balance: block.balance.to_string(),
            link: block.link.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct StoredBlock {
    #[serde(rename = "type")]
    block_type: String,
    account: Option<String>,
    previous: Option<String>,
    representative: Option<String>,
    balance: Option<String>,
    link: Option<String>,
}

impl BlockFields {
    /// Pull the hashed fields out of a block's stored JSON contents. Only state
    /// blocks carry all five.
    pub fn from_contents(contents: &str) -> Result<Self, WalletError> {
        let stored: StoredBlock = serde_json::from_str(contents)
            .map_err(|e| WalletError::PreviousBlockMissing(format!("undecodable contents: {e}")))?;
        if stored.block_type != "state" {
            return Err(WalletError::PreviousBlockMissing(format!(
                "previous is a legacy {} block",
                stored.block_type
            )));
        }
        let missing = |field: &str| WalletError::PreviousBlockMissing(format!("missing {field}"));
        Ok(Self {
            account: stored.account.ok_or_else(|| missing("account"))?,
            previous: stored.previous.ok_or_else(|| missing("previous"))?,
            representative: stored.representative.ok_or_else(|| missing("representative"))?,
            balance: stored.balance.ok_or_else(|| missing("balance"))?,
            link: stored.link.ok_or_else(|| missing("link"))?,
        })
    }

    pub fn to_candidate(&self) -> Result<CandidateBlock, WalletError> {
        let hash = |field: &str, value: &str| {
            value
                .parse::<BlockHash>()
                .map_err(|e| WalletError::Encoding(format!("{field}: {e}")))
        };
        Ok(CandidateBlock {
            account: Account::from_input(&self.account),
            previous: hash("previous", &self.previous)?,
            representative: Account::from_input(&self.representative),
            balance: self
                .balance
                .parse::<RawAmount>()
                .map_err(|e| WalletError::Encoding(format!("balance: {e}")))?,
            link: hash("link", &self.link)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningEnvelope {
    pub block: BlockFields,
    pub previous: BlockFields,
}

impl SigningEnvelope {
    pub fn new(block: &CandidateBlock, previous: BlockFields) -> Self {
        Self {
            block: BlockFields::from(block),
            previous,
        }
    }

    /// `nanosign:` followed by compact JSON.
    pub fn to_payload(&self) -> Result<String, WalletError> {
        let json = serde_json::to_string(self).map_err(|e| WalletError::Encoding(e.to_string()))?;
        Ok(format!("{SCHEME}{json}"))
    }

    pub fn parse(payload: &str) -> Result<Self, WalletError> {
        let json = payload
            .trim()
            .strip_prefix(SCHEME)
            .ok_or_else(|| WalletError::Encoding(format!("payload does not start with {SCHEME}")))?;
        serde_json::from_str(json).map_err(|e| WalletError::Encoding(format!("envelope: {e}")))
    }

    /// Hash of the block to be signed.
    pub fn block_hash(&self, hasher: &dyn BlockHasher) -> Result<BlockHash, WalletError> {
        self.block.to_candidate()?.hash(hasher)
    }

    /// Recompute the predecessor's hash and check it is the block's `previous`.
    /// Returns the verified predecessor hash.
    pub fn verify_previous(&self, hasher: &dyn BlockHasher) -> Result<BlockHash, WalletError> {
        let expected = self.block.to_candidate()?.previous;
        let computed = self.previous.to_candidate()?.hash(hasher)?;
        if computed != expected {
            return Err(WalletError::PreviousBlockMissing(format!(
                "predecessor hashes to {computed}, block expects {expected}"
            )));
        }
        Ok(computed)
    }
}
