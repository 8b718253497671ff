//! Wallet engine configuration with TOML file support.

use lattice_types::{Account, DecimalAmount, Denomination};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::WalletError;
use crate::representatives::{KnownRepresentative, RepresentativeDirectory};

/// Configuration for the wallet engine.
///
/// Can be loaded from a TOML file via [`WalletConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Node JSON-RPC endpoint.
    #[serde(default = "default_node_url")]
    pub node_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Pending credits below this many whole units are hidden. Decimal text.
    #[serde(default)]
    pub minimum_receive: Option<String>,

    /// Used for send blocks when the account has no representative yet.
    #[serde(default)]
    pub default_representative: Option<String>,

    #[serde(default = "default_history_page_size")]
    pub history_page_size: u32,

    #[serde(default = "default_history_page_step")]
    pub history_page_step: u32,

    #[serde(default = "default_max_history_page_size")]
    pub max_history_page_size: u32,

    /// How many pending credits to fetch per refresh.
    #[serde(default = "default_pending_count")]
    pub pending_count: u32,

    #[serde(default = "default_refresh_cooldown_secs")]
    pub refresh_cooldown_secs: u64,

    #[serde(default)]
    pub default_denomination: Denomination,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Known representatives, as `[[representatives]]` tables with
    /// `account` and `name`.
    #[serde(default)]
    pub representatives: Vec<KnownRepresentative>,
}

fn default_node_url() -> String {
    "http://127.0.0.1:7076".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_history_page_size() -> u32 {
    25
}

fn default_history_page_step() -> u32 {
    25
}

fn default_max_history_page_size() -> u32 {
    200
}

fn default_pending_count() -> u32 {
    50
}

fn default_refresh_cooldown_secs() -> u64 {
    5
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl WalletConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, WalletError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| WalletError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, WalletError> {
        let config: Self = toml::from_str(s).map_err(|e| WalletError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, WalletError> {
        toml::to_string_pretty(self).map_err(|e| WalletError::Config(e.to_string()))
    }

    fn validate(&self) -> Result<(), WalletError> {
        if self.history_page_size == 0 || self.history_page_size > self.max_history_page_size {
            return Err(WalletError::Config(format!(
                "history_page_size must be in 1..={}",
                self.max_history_page_size
            )));
        }
        self.minimum_receive()?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The pending threshold in whole units, if one is configured.
    pub fn minimum_receive(&self) -> Result<Option<DecimalAmount>, WalletError> {
        self.minimum_receive
            .as_deref()
            .map(|text| {
                text.parse::<DecimalAmount>()
                    .map_err(|e| WalletError::Config(format!("minimum_receive: {e}")))
            })
            .transpose()
    }

    pub fn representative_directory(&self) -> RepresentativeDirectory {
        RepresentativeDirectory::new(self.representatives.clone())
    }

    pub fn default_representative(&self) -> Option<Account> {
        self.default_representative
            .as_deref()
            .map(Account::from_input)
            .filter(|a| !a.is_empty())
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            node_url: default_node_url(),
            request_timeout_secs: default_request_timeout_secs(),
            minimum_receive: None,
            default_representative: None,
            history_page_size: default_history_page_size(),
            history_page_step: default_history_page_step(),
            max_history_page_size: default_max_history_page_size(),
            pending_count: default_pending_count(),
            refresh_cooldown_secs: default_refresh_cooldown_secs(),
            default_denomination: Denomination::default(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            representatives: Vec::new(),
        }
    }
}
