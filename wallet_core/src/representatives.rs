//! Known representatives and the fallback pick policy.

use lattice_types::Account;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::search::{search, Named};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownRepresentative {
    pub account: Account,
    pub name: String,
}

impl Named for KnownRepresentative {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Chooses a representative when the account has none and none is configured.
pub trait RepresentativePicker: Send + Sync {
    fn pick(&self) -> Option<Account>;
}

#[derive(Clone, Debug, Default)]
pub struct RepresentativeDirectory {
    known: Vec<KnownRepresentative>,
}

impl RepresentativeDirectory {
    pub fn new(known: Vec<KnownRepresentative>) -> Self {
        Self { known }
    }

    pub fn get(&self, account: &Account) -> Option<&KnownRepresentative> {
        self.known.iter().find(|r| &r.account == account)
    }

    /// Label for an account, if it is a known representative.
    pub fn label(&self, account: &Account) -> Option<String> {
        self.get(account).map(|r| r.name.clone())
    }

    /// Known representatives sorted by name.
    pub fn sorted(&self) -> Vec<KnownRepresentative> {
        let mut reps = self.known.clone();
        reps.sort_by_key(|r| r.name.to_lowercase());
        reps
    }

    pub fn search(&self, query: &str, limit: usize) -> Vec<KnownRepresentative> {
        let sorted = self.sorted();
        search(query, &sorted, limit).into_iter().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

impl RepresentativePicker for RepresentativeDirectory {
    fn pick(&self) -> Option<Account> {
        self.known
            .choose(&mut rand::thread_rng())
            .map(|r| r.account.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> RepresentativeDirectory {
        RepresentativeDirectory::new(vec![
            KnownRepresentative {
                account: Account::new("nano_zeta"),
                name: "Zeta Rep".into(),
            },
            KnownRepresentative {
                account: Account::new("nano_alpha"),
                name: "alpha rep".into(),
            },
        ])
    }

    #[test]
    fn sorted_ignores_case() {
        let names: Vec<String> = directory().sorted().into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["alpha rep", "Zeta Rep"]);
    }

    #[test]
    fn label_for_known_account() {
        let dir = directory();
        assert_eq!(dir.label(&Account::new("nano_zeta")).as_deref(), Some("Zeta Rep"));
        assert_eq!(dir.label(&Account::new("nano_other")), None);
    }

    #[test]
    fn pick_returns_a_known_account() {
        let dir = directory();
        let picked = dir.pick().unwrap();
        assert!(dir.get(&picked).is_some());
    }

    #[test]
    fn empty_directory_picks_nothing() {
        assert_eq!(RepresentativeDirectory::default().pick(), None);
    }

    #[test]
    fn search_runs_over_sorted_list() {
        let hits = directory().search("rep", 1);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "alpha rep");
    }
}
