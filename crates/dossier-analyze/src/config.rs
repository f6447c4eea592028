//! Analyzer configuration.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for content analysis and duplicate detection.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct AnalyzerConfig {
    /// Minimum pairwise similarity for a "similar" duplicate pair.
    #[builder(default = "0.8")]
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Documents shorter than this many characters are not analyzed.
    #[builder(default = "100")]
    #[serde(default = "default_min_content_length")]
    pub min_content_length: usize,

    /// Number of high-frequency body words kept as topics.
    #[builder(default = "10")]
    #[serde(default = "default_max_body_topics")]
    pub max_body_topics: usize,

    /// Minimum length of a heading word to count as a topic.
    #[builder(default = "4")]
    #[serde(default = "default_min_word_len")]
    pub min_heading_word_len: usize,

    /// Minimum length of a body word to count as a topic.
    #[builder(default = "4")]
    #[serde(default = "default_min_word_len")]
    pub min_body_word_len: usize,

    /// Minimum mean similarity for a consolidation candidate.
    #[builder(default = "0.6")]
    #[serde(default = "default_candidate_min_similarity")]
    pub candidate_min_similarity: f64,

    /// Mean word count above which the comprehensive strategy is chosen.
    #[builder(default = "2000")]
    #[serde(default = "default_comprehensive_word_threshold")]
    pub comprehensive_word_threshold: usize,

    /// Only analyze files that are the main file of a document folder.
    #[builder(default)]
    #[serde(default)]
    pub canonical_only: bool,
}

fn default_similarity_threshold() -> f64 {
    0.8
}

fn default_min_content_length() -> usize {
    100
}

fn default_max_body_topics() -> usize {
    10
}

fn default_min_word_len() -> usize {
    4
}

fn default_candidate_min_similarity() -> f64 {
    0.6
}

fn default_comprehensive_word_threshold() -> usize {
    2000
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            min_content_length: default_min_content_length(),
            max_body_topics: default_max_body_topics(),
            min_heading_word_len: default_min_word_len(),
            min_body_word_len: default_min_word_len(),
            candidate_min_similarity: default_candidate_min_similarity(),
            comprehensive_word_threshold: default_comprehensive_word_threshold(),
            canonical_only: false,
        }
    }
}

impl AnalyzerConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("similarity_threshold", self.similarity_threshold),
            ("candidate_min_similarity", self.candidate_min_similarity),
        ] {
            if let Some(v) = value
                && !(0.0..=1.0).contains(&v)
            {
                return Err(format!("{name} must be between 0 and 1, got {v}"));
            }
        }
        Ok(())
    }
}

impl AnalyzerConfig {
    /// Create a new config builder.
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder::default()
    }
}
