//! Account identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A ledger account in its textual form (`nano_` or legacy `xrb_` prefix).
///
/// Construction does not verify the checksum; use `lattice_crypto::decode_account`
/// for that.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Account(String);

impl Account {
    /// The prefix used when encoding new addresses.
    pub const PREFIX: &'static str = "nano_";
    /// Older prefix still accepted on input.
    pub const LEGACY_PREFIX: &'static str = "xrb_";

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Build from user input, dropping any whitespace pasted into the id.
    pub fn from_input(input: &str) -> Self {
        Self(input.chars().filter(|c| !c.is_whitespace()).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The encoded part after the prefix, if the prefix is recognised.
    pub fn body(&self) -> Option<&str> {
        self.0
            .strip_prefix(Self::PREFIX)
            .or_else(|| self.0.strip_prefix(Self::LEGACY_PREFIX))
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Account {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Account {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
