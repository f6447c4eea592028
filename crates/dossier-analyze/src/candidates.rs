//! Topic-based consolidation candidates.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::analysis::ContentAnalysis;
use crate::config::AnalyzerConfig;
use crate::similarity::similarity;

/// How merged content is laid out.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Strategy {
    /// Concatenate sources under a table of contents.
    #[default]
    Simple,
    /// Pool sections by heading into themes.
    Structured,
    /// Deduplicate sentences and reorganize by theme.
    Comprehensive,
}

/// A set of documents sharing a topic that could be merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidationCandidate {
    /// Shared topic.
    pub topic: String,
    /// Member paths, in analysis order.
    pub paths: Vec<PathBuf>,
    /// Mean pairwise similarity of the members.
    pub mean_similarity: f64,
    /// Suggested merge strategy.
    pub strategy: Strategy,
    /// Suggested title for the merged document.
    pub recommended_title: String,
    /// Combined word count.
    pub total_words: usize,
}

/// Find groups of documents sharing a topic with enough mutual similarity.
pub fn find_candidates(
    config: &AnalyzerConfig,
    analyses: &[ContentAnalysis],
) -> Vec<ConsolidationCandidate> {
    let mut by_topic: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (idx, analysis) in analyses.iter().enumerate() {
        for topic in &analysis.topics {
            by_topic.entry(topic.as_str()).or_default().push(idx);
        }
    }

    let topic_groups = by_topic
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .sorted_by(|(ta, a), (tb, b)| b.len().cmp(&a.len()).then_with(|| ta.cmp(tb)));

    let mut cache: HashMap<(usize, usize), f64> = HashMap::new();
    let mut seen: HashSet<Vec<usize>> = HashSet::new();
    let mut candidates = Vec::new();

    for (topic, members) in topic_groups {
        if !seen.insert(members.clone()) {
            continue;
        }

        let scores: Vec<f64> = members
            .iter()
            .tuple_combinations()
            .map(|(&i, &j)| {
                *cache
                    .entry((i, j))
                    .or_insert_with(|| similarity(&analyses[i], &analyses[j]))
            })
            .collect();
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        if mean < config.candidate_min_similarity {
            continue;
        }

        let docs: Vec<&ContentAnalysis> = members.iter().map(|&i| &analyses[i]).collect();
        let total_words: usize = docs.iter().map(|d| d.word_count).sum();
        candidates.push(ConsolidationCandidate {
            topic: topic.to_string(),
            paths: docs.iter().map(|d| d.path.clone()).collect(),
            mean_similarity: mean,
            strategy: choose_strategy(config, &docs),
            recommended_title: title_case(topic),
            total_words,
        });
    }

    candidates.sort_by(|a, b| b.mean_similarity.total_cmp(&a.mean_similarity));
    candidates
}

/// Pick a strategy from the members' size and features.
pub fn choose_strategy(config: &AnalyzerConfig, docs: &[&ContentAnalysis]) -> Strategy {
    if docs.is_empty() {
        return Strategy::Simple;
    }
    let mean_words = docs.iter().map(|d| d.word_count).sum::<usize>() as f64 / docs.len() as f64;
    if mean_words > config.comprehensive_word_threshold as f64 {
        Strategy::Comprehensive
    } else if docs.iter().any(|d| d.structure.has_code || d.has_images()) {
        Strategy::Structured
    } else {
        Strategy::Simple
    }
}

/// Uppercase the first letter of every word.
pub fn title_case(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("kubernetes"), "Kubernetes");
        assert_eq!(title_case("machine-learning notes"), "Machine Learning Notes");
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!("structured".parse::<Strategy>().unwrap(), Strategy::Structured);
        assert_eq!(Strategy::Comprehensive.to_string(), "comprehensive");
        assert!("fancy".parse::<Strategy>().is_err());
    }
}
