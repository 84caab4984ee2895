//! Named integer facts computed from collected evidence

use indexmap::IndexMap;

/// The counters one analyzer exposes to its outcome conditions.
///
/// Insertion order is kept so summaries list facts the way the analyzer
/// declared them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactTable {
    facts: IndexMap<String, i64>,
}

impl FactTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: i64) -> Self {
        self.facts.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.facts.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.facts.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.facts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// `name=value` pairs, comma separated
    pub fn summary(&self) -> String {
        self.iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
