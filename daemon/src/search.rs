/// Read-only, case-insensitive search over the loaded catalog.
use crate::catalog::GameRecord;
use crate::config::DEFAULT_MAX_SEARCH_RESULTS;

struct Entry {
    record: GameRecord,
    name: String,
    aliases: Vec<String>,
}

impl Entry {
    fn matches(&self, needle: &str) -> bool {
        self.name.contains(needle) || self.aliases.iter().any(|a| a.contains(needle))
    }
}

/// The catalog plus lowercased names and aliases, in catalog order.
pub struct SearchIndex {
    entries: Vec<Entry>,
    max_results: usize,
}

impl SearchIndex {
    pub fn new(catalog: Vec<GameRecord>) -> Self {
        Self::with_limit(catalog, DEFAULT_MAX_SEARCH_RESULTS)
    }

    /// `max_results` is clamped to `1..=DEFAULT_MAX_SEARCH_RESULTS`.
    pub fn with_limit(catalog: Vec<GameRecord>, max_results: usize) -> Self {
        let entries = catalog
            .into_iter()
            .map(|record| Entry {
                name: record.name.to_lowercase(),
                aliases: record.aliases.iter().map(|a| a.to_lowercase()).collect(),
                record,
            })
            .collect();
        Self {
            entries,
            max_results: clamp_limit(max_results),
        }
    }

    pub fn set_limit(&mut self, max_results: usize) {
        self.max_results = clamp_limit(max_results);
    }

    pub fn limit(&self) -> usize {
        self.max_results
    }

    /// Records whose name or any alias contains `query`, ignoring case.
    ///
    /// A blank query returns nothing. Otherwise the query is matched as typed
    /// (lowercased, not trimmed) and results keep catalog order, capped at
    /// the configured limit.
    pub fn search(&self, query: &str) -> Vec<&GameRecord> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.matches(&needle))
            .take(self.max_results)
            .map(|e| &e.record)
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&GameRecord> {
        self.entries.iter().map(|e| &e.record).find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn clamp_limit(max_results: usize) -> usize {
    max_results.clamp(1, DEFAULT_MAX_SEARCH_RESULTS)
}
