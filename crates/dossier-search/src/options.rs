//! Search options.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Options for [`SearchEngine::search_documents`](crate::SearchEngine::search_documents).
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct SearchOptions {
    /// Restrict the search to one category directory.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub category: Option<String>,

    /// Maximum number of results returned.
    #[builder(default = "10")]
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Treat the query as a regular expression.
    #[builder(default)]
    #[serde(default)]
    pub use_regex: bool,

    /// Match case exactly.
    #[builder(default)]
    #[serde(default)]
    pub case_sensitive: bool,

    /// Maximum excerpts kept per result.
    #[builder(default = "5")]
    #[serde(default = "default_max_excerpts")]
    pub max_excerpts: usize,

    /// Stop scanning after `limit * candidate_pool_factor` matching
    /// folders. Zero scans everything.
    #[builder(default = "5")]
    #[serde(default = "default_candidate_pool_factor")]
    pub candidate_pool_factor: usize,
}

fn default_limit() -> usize {
    10
}

fn default_max_excerpts() -> usize {
    5
}

fn default_candidate_pool_factor() -> usize {
    5
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            category: None,
            limit: default_limit(),
            use_regex: false,
            case_sensitive: false,
            max_excerpts: default_max_excerpts(),
            candidate_pool_factor: default_candidate_pool_factor(),
        }
    }
}

impl SearchOptionsBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.limit == Some(0) {
            return Err("limit must be at least 1".to_string());
        }
        Ok(())
    }
}

impl SearchOptions {
    /// Create a new options builder.
    pub fn builder() -> SearchOptionsBuilder {
        SearchOptionsBuilder::default()
    }

    /// Number of matching folders after which traversal stops.
    pub fn candidate_pool(&self) -> usize {
        match self.candidate_pool_factor {
            0 => usize::MAX,
            factor => self.limit.max(1).saturating_mul(factor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SearchOptions::default();
        assert_eq!(options.limit, 10);
        assert!(!options.use_regex);
        assert!(!options.case_sensitive);
        assert_eq!(options.candidate_pool(), 50);
    }

    #[test]
    fn test_zero_factor_is_exhaustive() {
        let options = SearchOptions::builder()
            .candidate_pool_factor(0usize)
            .build()
            .unwrap();
        assert_eq!(options.candidate_pool(), usize::MAX);
    }

    #[test]
    fn test_builder_rejects_zero_limit() {
        assert!(SearchOptions::builder().limit(0usize).build().is_err());
        let options = SearchOptions::builder()
            .category("Notes")
            .limit(3usize)
            .build()
            .unwrap();
        assert_eq!(options.category.as_deref(), Some("Notes"));
        assert_eq!(options.limit, 3);
    }

    #[test]
    fn test_serde_defaults() {
        let options: SearchOptions = serde_json::from_str(r#"{"use_regex": true}"#).unwrap();
        assert!(options.use_regex);
        assert_eq!(options.limit, 10);
        assert_eq!(options.max_excerpts, 5);
    }
}
