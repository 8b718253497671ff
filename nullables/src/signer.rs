//! Nullable signer — records change requests instead of signing them.

use async_trait::async_trait;
use lattice_types::BlockHash;
use lattice_wallet_core::{ChangeRequest, ChangeSigner, SignerError};
use std::sync::{Arc, Mutex};

use crate::ledger::NullLedger;

pub struct NullSigner {
    outcome: Result<BlockHash, SignerError>,
    /// When set, a successful change is applied to this ledger.
    ledger: Option<Arc<NullLedger>>,
    requests: Mutex<Vec<ChangeRequest>>,
}

impl NullSigner {
    /// Every request succeeds and "publishes" a block with `hash`.
    pub fn succeeding(hash: BlockHash) -> Self {
        Self {
            outcome: Ok(hash),
            ledger: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(SignerError(message.to_string())),
            ledger: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Apply successful changes to `ledger` (new representative and frontier).
    pub fn applying_to(mut self, ledger: Arc<NullLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// All requests received (for assertions).
    pub fn requests(&self) -> Vec<ChangeRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ChangeSigner for NullSigner {
    async fn sign_change(&self, request: &ChangeRequest) -> Result<BlockHash, SignerError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        let hash = self.outcome.clone()?;
        if let Some(ledger) = &self.ledger {
            ledger.apply_change(&request.account, &request.representative, hash);
        }
        Ok(hash)
    }
}
