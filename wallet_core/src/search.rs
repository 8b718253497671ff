//! Incremental name search over labelled accounts.

/// Anything searchable by a display name.
pub trait Named {
    fn name(&self) -> &str;
}

/// Suggestions shown while typing.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Entries whose name contains `query` (case-insensitive), in corpus order, at most
/// `limit` of them. An empty query matches everything.
pub fn search<'a, T: Named>(query: &str, corpus: &'a [T], limit: usize) -> Vec<&'a T> {
    let needle = query.to_lowercase();
    corpus
        .iter()
        .filter(|item| item.name().to_lowercase().contains(&needle))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item(&'static str);

    impl Named for Item {
        fn name(&self) -> &str {
            self.0
        }
    }

    const CORPUS: [Item; 4] = [Item("Alpha Node"), Item("beta"), Item("NodeCo"), Item("gamma")];

    #[test]
    fn case_insensitive_substring() {
        let hits: Vec<&str> = search("node", &CORPUS, 5).iter().map(|i| i.0).collect();
        assert_eq!(hits, ["Alpha Node", "NodeCo"]);
    }

    #[test]
    fn limit_applies_after_filter() {
        assert_eq!(search("a", &CORPUS, 2).len(), 2);
    }

    #[test]
    fn empty_query_matches_in_order() {
        let hits: Vec<&str> = search("", &CORPUS, DEFAULT_SEARCH_LIMIT)
            .iter()
            .map(|i| i.0)
            .collect();
        assert_eq!(hits, ["Alpha Node", "beta", "NodeCo", "gamma"]);
    }
}
