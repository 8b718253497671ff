//! Address-book lookup seam.
//!
//! Persistent storage is somebody else's job. [`MemoryAddressBook`] keeps entries
//! for the lifetime of the process only.

use lattice_types::Account;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

use crate::error::WalletError;
use crate::search::Named;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBookEntry {
    pub account: Account,
    pub name: String,
}

impl Named for AddressBookEntry {
    fn name(&self) -> &str {
        &self.name
    }
}

pub trait AddressBook: Send + Sync {
    fn account_name(&self, account: &Account) -> Option<String>;

    fn save_address(&self, account: &Account, name: &str) -> Result<(), WalletError>;

    fn delete_address(&self, account: &Account) -> Result<(), WalletError>;

    /// All entries, in insertion order.
    fn entries(&self) -> Vec<AddressBookEntry>;
}

/// Outcome of editing the label for an account.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LabelEdit {
    Saved(String),
    Removed,
    Unchanged,
}

/// Apply a user-entered label: blank removes an existing entry, anything else is
/// saved trimmed.
pub fn apply_label(
    book: &dyn AddressBook,
    account: &Account,
    input: &str,
) -> Result<LabelEdit, WalletError> {
    let name = input.trim();
    if name.is_empty() {
        if book.account_name(account).is_some() {
            book.delete_address(account)?;
            tracing::info!(%account, "removed address book entry");
            return Ok(LabelEdit::Removed);
        }
        return Ok(LabelEdit::Unchanged);
    }
    book.save_address(account, name)?;
    tracing::info!(%account, name, "saved address book entry");
    Ok(LabelEdit::Saved(name.to_string()))
}

#[derive(Default)]
pub struct MemoryAddressBook {
    entries: RwLock<Vec<AddressBookEntry>>,
}

impl MemoryAddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: impl IntoIterator<Item = (Account, String)>) -> Self {
        let book = Self::new();
        if let Ok(mut guard) = book.entries.write() {
            guard.extend(
                entries
                    .into_iter()
                    .map(|(account, name)| AddressBookEntry { account, name }),
            );
        }
        book
    }
}

impl AddressBook for MemoryAddressBook {
    fn account_name(&self, account: &Account) -> Option<String> {
        let entries = self.entries.read().ok()?;
        entries
            .iter()
            .find(|e| &e.account == account)
            .map(|e| e.name.clone())
    }

    fn save_address(&self, account: &Account, name: &str) -> Result<(), WalletError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| WalletError::Storage("lock poisoned".into()))?;
        match entries.iter_mut().find(|e| &e.account == account) {
            Some(existing) => existing.name = name.to_string(),
            None => entries.push(AddressBookEntry {
                account: account.clone(),
                name: name.to_string(),
            }),
        }
        Ok(())
    }

    fn delete_address(&self, account: &Account) -> Result<(), WalletError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| WalletError::Storage("lock poisoned".into()))?;
        entries.retain(|e| &e.account != account);
        Ok(())
    }

    fn entries(&self) -> Vec<AddressBookEntry> {
        self.entries.read().map(|e| e.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Account {
        Account::new("nano_alice")
    }

    #[test]
    fn poisoned_book_reports_a_storage_error() {
        let book = std::sync::Arc::new(MemoryAddressBook::new());
        let holder = book.clone();
        let _ = std::thread::spawn(move || {
            let _guard = holder.entries.write().unwrap();
            panic!("writer died");
        })
        .join();

        let err = book.save_address(&alice(), "Alice").unwrap_err();
        assert!(matches!(err, WalletError::Storage(_)));
        assert_eq!(err.notice().message, "Address book could not be updated");
        assert!(matches!(
            book.delete_address(&alice()),
            Err(WalletError::Storage(_))
        ));
    }

    #[test]
    fn save_then_lookup() {
        let book = MemoryAddressBook::new();
        book.save_address(&alice(), "Alice").unwrap();
        assert_eq!(book.account_name(&alice()).as_deref(), Some("Alice"));
    }

    #[test]
    fn saving_again_renames() {
        let book = MemoryAddressBook::new();
        book.save_address(&alice(), "Alice").unwrap();
        book.save_address(&alice(), "Alice B").unwrap();
        assert_eq!(book.entries().len(), 1);
        assert_eq!(book.account_name(&alice()).as_deref(), Some("Alice B"));
    }

    #[test]
    fn blank_label_removes_existing_entry() {
        let book = MemoryAddressBook::with_entries([(alice(), "Alice".to_string())]);
        assert_eq!(apply_label(&book, &alice(), "   ").unwrap(), LabelEdit::Removed);
        assert_eq!(book.account_name(&alice()), None);
    }

    #[test]
    fn blank_label_without_entry_is_a_no_op() {
        let book = MemoryAddressBook::new();
        assert_eq!(apply_label(&book, &alice(), "").unwrap(), LabelEdit::Unchanged);
    }

    #[test]
    fn label_is_trimmed() {
        let book = MemoryAddressBook::new();
        assert_eq!(
            apply_label(&book, &alice(), "  Savings ").unwrap(),
            LabelEdit::Saved("Savings".into())
        );
        assert_eq!(book.account_name(&alice()).as_deref(), Some("Savings"));
    }
}
