//! Run-wide citation ledger.
//!
//! Tools report the sources behind each observation. The ledger
//! deduplicates them across every task of a run, keyed by URL when one is
//! present and by the lower-cased source label otherwise. Numbers are
//! assigned only when the ledger is read, in first-seen order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A source as reported by a capability, before numbering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawReference {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl RawReference {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            url: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    fn dedup_key(&self) -> Option<String> {
        match self.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Some(format!("url:{}", url)),
            _ => {
                let source = self.source.trim();
                (!source.is_empty()).then(|| format!("source:{}", source.to_lowercase()))
            }
        }
    }
}

/// A numbered, deduplicated reference of the final result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub number: usize,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.url {
            Some(url) => write!(f, "[{}] {} - {}", self.number, self.source, url),
            None => write!(f, "[{}] {}", self.number, self.source),
        }
    }
}

/// Append-only, first-seen-ordered reference set for one run.
#[derive(Debug, Clone, Default)]
pub struct ReferenceLedger {
    seen: HashSet<String>,
    entries: Vec<RawReference>,
}

impl ReferenceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge references, returning how many were new. Entries with neither
    /// a URL nor a source label are ignored.
    pub fn merge<I>(&mut self, references: I) -> usize
    where
        I: IntoIterator<Item = RawReference>,
    {
        let before = self.entries.len();
        for reference in references {
            if let Some(key) = reference.dedup_key()
                && self.seen.insert(key)
            {
                self.entries.push(reference);
            }
        }
        self.entries.len() - before
    }

    /// Number the deduplicated references from 1, in first-seen order.
    pub fn numbered(&self) -> Vec<Reference> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, r)| Reference {
                number: i + 1,
                source: r.source.clone(),
                url: r.url.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_url_different_source_casing() {
        let mut ledger = ReferenceLedger::new();
        ledger.merge([RawReference::new("Nature").with_url("https://nature.com/a")]);
        ledger.merge([RawReference::new("NATURE").with_url("https://nature.com/a")]);

        let refs = ledger.numbered();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].source, "Nature");
        assert_eq!(refs[0].url.as_deref(), Some("https://nature.com/a"));
    }

    #[test]
    fn test_source_key_without_url() {
        let mut ledger = ReferenceLedger::new();
        let added = ledger.merge([
            RawReference::new("Course Notes, ch. 2"),
            RawReference::new("course notes, CH. 2"),
            RawReference::new("Course Notes, ch. 3"),
            RawReference::new("   "),
        ]);
        assert_eq!(added, 2);
    }

    #[test]
    fn test_numbering_in_first_seen_order() {
        let mut ledger = ReferenceLedger::new();
        ledger.merge([
            RawReference::new("B").with_url("https://b"),
            RawReference::new("A").with_url("https://a"),
        ]);
        ledger.merge([
            RawReference::new("B again").with_url("https://b"),
            RawReference::new("C"),
        ]);

        let refs = ledger.numbered();
        let labels: Vec<_> = refs.iter().map(|r| (r.number, r.source.as_str())).collect();
        assert_eq!(labels, vec![(1, "B"), (2, "A"), (3, "C")]);
        assert_eq!(refs[2].to_string(), "[3] C");
        assert_eq!(refs[0].to_string(), "[1] B - https://b");
    }
}
