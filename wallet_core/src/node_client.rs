//! JSON-RPC ledger client.

use async_trait::async_trait;
use lattice_types::{Account, BlockHash, RawAmount, Timestamp};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::WalletError;
use crate::ledger::{
    AccountInfo, BlockKind, BlockOwner, HistoryRecord, LedgerSource, PendingBlock,
};

const ACCOUNT_NOT_FOUND: &str = "Account not found";

/// HTTP client for a node's JSON-RPC endpoint.
#[derive(Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    node_url: String,
}

impl NodeClient {
    /// Create a client for `node_url` (e.g. `http://127.0.0.1:7076`).
    pub fn new(node_url: impl Into<String>, timeout: Duration) -> Result<Self, WalletError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| WalletError::Network(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            node_url: node_url.into(),
        })
    }

    pub fn node_url(&self) -> &str {
        &self.node_url
    }

    /// POST `params` with `action` inserted. A node-level `error` field comes back
    /// as `Ok(Err(message))` so callers can decide which errors are data.
    async fn rpc_call(
        &self,
        action: &str,
        params: serde_json::Value,
    ) -> Result<Result<serde_json::Value, String>, WalletError> {
        let mut body = params;
        body.as_object_mut()
            .ok_or_else(|| WalletError::Network("params must be a JSON object".into()))?
            .insert("action".to_string(), serde_json::json!(action));

        tracing::debug!(action, url = %self.node_url, "rpc request");
        let response = self
            .http
            .post(&self.node_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| WalletError::Network(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(WalletError::Network(format!(
                "node returned HTTP {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| WalletError::Network(format!("invalid JSON response: {e}")))?;

        if let Some(err) = json.get("error").and_then(|e| e.as_str()) {
            return Ok(Err(err.to_string()));
        }
        Ok(Ok(json))
    }

    /// Like [`rpc_call`](Self::rpc_call) but every node error is a network error.
    async fn rpc<T: DeserializeOwned>(
        &self,
        action: &str,
        params: serde_json::Value,
    ) -> Result<T, WalletError> {
        let json = self
            .rpc_call(action, params)
            .await?
            .map_err(|e| WalletError::Network(format!("node error: {e}")))?;
        decode(action, json)
    }
}

fn decode<T: DeserializeOwned>(action: &str, json: serde_json::Value) -> Result<T, WalletError> {
    serde_json::from_value(json)
        .map_err(|e| WalletError::Network(format!("invalid {action} response: {e}")))
}

fn parse_raw(field: &str, value: &str) -> Result<RawAmount, WalletError> {
    value
        .parse()
        .map_err(|e| WalletError::Network(format!("invalid {field} amount {value:?}: {e}")))
}

fn parse_hash(field: &str, value: &str) -> Result<BlockHash, WalletError> {
    value
        .parse()
        .map_err(|e| WalletError::Network(format!("invalid {field} hash {value:?}: {e}")))
}

fn parse_timestamp(value: Option<&str>) -> Option<Timestamp> {
    value.and_then(|v| v.parse().ok()).map(Timestamp::new)
}

/// The node encodes an empty map or list as `""`.
#[derive(Deserialize)]
#[serde(untagged)]
enum OrEmpty<T> {
    Value(T),
    Empty(#[allow(dead_code)] String),
}

impl<T: Default> OrEmpty<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Value(v) => v,
            Self::Empty(_) => T::default(),
        }
    }
}

impl<T: Default> Default for OrEmpty<T> {
    fn default() -> Self {
        Self::Value(T::default())
    }
}

#[derive(Deserialize)]
struct AccountInfoResponse {
    frontier: String,
    balance: String,
    #[serde(default)]
    pending: Option<String>,
    #[serde(default)]
    receivable: Option<String>,
    #[serde(default)]
    representative: Option<String>,
    #[serde(default)]
    block_count: Option<String>,
}

#[derive(Deserialize)]
struct PendingResponse {
    #[serde(default)]
    blocks: OrEmpty<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Deserialize)]
struct PendingSource {
    amount: String,
    source: String,
    #[serde(default)]
    local_timestamp: Option<String>,
}

#[derive(Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    history: OrEmpty<Vec<HistoryItem>>,
}

#[derive(Deserialize)]
struct HistoryItem {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    subtype: Option<String>,
    #[serde(default)]
    account: Option<String>,
    #[serde(default)]
    amount: Option<String>,
    hash: String,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    local_timestamp: Option<String>,
    #[serde(default)]
    height: Option<String>,
}

#[derive(Deserialize)]
struct BlocksInfoResponse {
    #[serde(default)]
    blocks: OrEmpty<BTreeMap<String, BlockAccountOnly>>,
}

#[derive(Deserialize)]
struct BlockAccountOnly {
    block_account: String,
}

#[derive(Deserialize)]
struct ValidateResponse {
    valid: String,
}

impl HistoryItem {
    fn into_record(self) -> Result<HistoryRecord, WalletError> {
        let link = match self.link.as_deref() {
            Some(l) if !l.is_empty() => Some(parse_hash("link", l)?),
            _ => None,
        };
        let amount = match self.amount.as_deref() {
            Some(a) if !a.is_empty() => parse_raw("history", a)?,
            _ => RawAmount::zero(),
        };
        Ok(HistoryRecord {
            block_type: BlockKind::parse(&self.block_type),
            subtype: self.subtype.as_deref().map(BlockKind::parse),
            account: Account::new(self.account.unwrap_or_default()),
            amount,
            hash: parse_hash("history", &self.hash)?,
            link,
            local_timestamp: parse_timestamp(self.local_timestamp.as_deref()),
            height: self.height.and_then(|h| h.parse().ok()),
        })
    }
}

#[async_trait]
impl LedgerSource for NodeClient {
    async fn account_info(&self, account: &Account) -> Result<Option<AccountInfo>, WalletError> {
        let params = serde_json::json!({
            "account": account.as_str(),
            "representative": "true",
            "pending": "true",
        });
        let json = match self.rpc_call("account_info", params).await? {
            Ok(json) => json,
            Err(e) if e == ACCOUNT_NOT_FOUND => return Ok(None),
            Err(e) => return Err(WalletError::Network(format!("node error: {e}"))),
        };
        let resp: AccountInfoResponse = decode("account_info", json)?;
        let pending = resp.pending.or(resp.receivable);
        Ok(Some(AccountInfo {
            frontier: parse_hash("frontier", &resp.frontier)?,
            representative: resp.representative.map(Account::new),
            balance: parse_raw("balance", &resp.balance)?,
            pending: match pending.as_deref() {
                Some(p) => parse_raw("pending", p)?,
                None => RawAmount::zero(),
            },
            block_count: resp
                .block_count
                .and_then(|c| c.parse().ok())
                .unwrap_or_default(),
        }))
    }

    async fn pending(
        &self,
        account: &Account,
        count: u32,
        threshold: Option<&RawAmount>,
    ) -> Result<Vec<PendingBlock>, WalletError> {
        let mut params = serde_json::json!({
            "account": account.as_str(),
            "count": count.to_string(),
            "source": "true",
        });
        if let (Some(threshold), Some(obj)) = (threshold, params.as_object_mut()) {
            obj.insert("threshold".into(), serde_json::json!(threshold.to_string()));
        }
        let resp: PendingResponse = self.rpc("pending", params).await?;

        resp.blocks
            .into_inner()
            .into_iter()
            .map(|(hash, value)| {
                let entry: PendingSource = decode("pending", value)?;
                Ok(PendingBlock {
                    hash: parse_hash("pending", &hash)?,
                    source: Account::new(entry.source),
                    amount: parse_raw("pending", &entry.amount)?,
                    local_timestamp: parse_timestamp(entry.local_timestamp.as_deref()),
                })
            })
            .collect()
    }

    async fn account_history(
        &self,
        account: &Account,
        count: u32,
    ) -> Result<Vec<HistoryRecord>, WalletError> {
        let params = serde_json::json!({
            "account": account.as_str(),
            "count": count.to_string(),
            "raw": true,
        });
        let json = match self.rpc_call("account_history", params).await? {
            Ok(json) => json,
            Err(e) if e == ACCOUNT_NOT_FOUND => return Ok(Vec::new()),
            Err(e) => return Err(WalletError::Network(format!("node error: {e}"))),
        };
        let resp: HistoryResponse = decode("account_history", json)?;
        resp.history
            .into_inner()
            .into_iter()
            .map(HistoryItem::into_record)
            .collect()
    }

    async fn blocks_info(&self, hashes: &[BlockHash]) -> Result<Vec<BlockOwner>, WalletError> {
        let hashes: Vec<String> = hashes.iter().map(ToString::to_string).collect();
        let params = serde_json::json!({
            "hashes": hashes,
            "include_not_found": "true",
        });
        let resp: BlocksInfoResponse = self.rpc("blocks_info", params).await?;
        resp.blocks
            .into_inner()
            .into_iter()
            .map(|(hash, info)| {
                Ok(BlockOwner {
                    hash: parse_hash("blocks_info", &hash)?,
                    block_account: Account::new(info.block_account),
                })
            })
            .collect()
    }

    async fn block_info(&self, hash: &BlockHash) -> Result<Option<String>, WalletError> {
        let params = serde_json::json!({ "hash": hash.to_string() });
        let json = match self.rpc_call("block_info", params).await? {
            Ok(json) => json,
            Err(e) if e == "Block not found" => return Ok(None),
            Err(e) => return Err(WalletError::Network(format!("node error: {e}"))),
        };
        Ok(match json.get("contents") {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(obj @ serde_json::Value::Object(_)) => Some(obj.to_string()),
            _ => None,
        })
    }

    async fn validate_account_number(&self, account: &str) -> Result<bool, WalletError> {
        let resp: ValidateResponse = self
            .rpc(
                "validate_account_number",
                serde_json::json!({ "account": account }),
            )
            .await?;
        Ok(resp.valid == "1")
    }
}
