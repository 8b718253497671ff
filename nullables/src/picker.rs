//! Nullable representative picker — deterministic choice for testing.

use lattice_types::Account;
use lattice_wallet_core::RepresentativePicker;
use std::sync::Mutex;

/// Returns pre-configured representatives in order, cycling.
pub struct NullPicker {
    choices: Vec<Account>,
    index: Mutex<usize>,
}

impl NullPicker {
    pub fn new(choices: Vec<Account>) -> Self {
        Self {
            choices,
            index: Mutex::new(0),
        }
    }

    /// Always picks `account`.
    pub fn constant(account: Account) -> Self {
        Self::new(vec![account])
    }

    /// Never has anything to offer.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl RepresentativePicker for NullPicker {
    fn pick(&self) -> Option<Account> {
        if self.choices.is_empty() {
            return None;
        }
        let mut idx = self.index.lock().ok()?;
        let current = *idx % self.choices.len();
        *idx += 1;
        Some(self.choices[current].clone())
    }
}
