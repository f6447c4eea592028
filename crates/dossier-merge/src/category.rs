//! Choosing the category of a consolidated folder.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use dossier_core::markdown;

/// Picks a category from a topic and the merged text.
pub trait CategoryResolver: Send + Sync {
    /// Category name, or `None` when nothing fits.
    fn resolve(&self, topic: &str, content: &str) -> Option<String>;
}

/// Keyword table: the category whose keywords occur most often wins.
///
/// Ties go to the category listed first. Matching is on lowercase words.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordCategories {
    table: IndexMap<String, Vec<String>>,
}

impl KeywordCategories {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category with its keywords.
    pub fn with_category<I, S>(mut self, category: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.table.insert(
            category.into(),
            keywords.into_iter().map(|k| k.into().to_lowercase()).collect(),
        );
        self
    }

    /// Check whether no categories are configured.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl CategoryResolver for KeywordCategories {
    fn resolve(&self, topic: &str, content: &str) -> Option<String> {
        let words: Vec<String> = markdown::tokens(topic).chain(markdown::tokens(content)).collect();
        let mut best: Option<(&str, usize)> = None;
        for (category, keywords) in &self.table {
            let hits = words
                .iter()
                .filter(|w| keywords.iter().any(|k| k.eq_ignore_ascii_case(w)))
                .count();
            if hits > 0 && best.is_none_or(|(_, top)| hits > top) {
                best = Some((category.as_str(), hits));
            }
        }
        best.map(|(category, _)| category.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> KeywordCategories {
        KeywordCategories::new()
            .with_category("Programming", ["rust", "python", "code"])
            .with_category("Cooking", ["flour", "oven", "recipe"])
    }

    #[test]
    fn test_most_hits_wins() {
        let resolved = table().resolve("bread", "Preheat the oven. Mix flour and code.");
        assert_eq!(resolved.as_deref(), Some("Cooking"));
    }

    #[test]
    fn test_no_hits_resolves_nothing() {
        assert_eq!(table().resolve("travel", "Pack a bag."), None);
    }

    #[test]
    fn test_deserializes_from_map() {
        let table: KeywordCategories =
            serde_json::from_str(r#"{"Work": ["meeting", "report"]}"#).unwrap();
        assert_eq!(table.resolve("weekly report", "").as_deref(), Some("Work"));
    }
}
