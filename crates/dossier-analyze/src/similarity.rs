//! Pairwise similarity between content signatures.

use std::collections::BTreeSet;

use crate::analysis::ContentAnalysis;

const TOPIC_WEIGHT: f64 = 0.4;
const STRUCTURE_WEIGHT: f64 = 0.2;
const CONTENT_WEIGHT: f64 = 0.4;

const HEADING_WEIGHT: f64 = 0.7;
const FORMAT_WEIGHT: f64 = 0.3;

const LENGTH_WEIGHT: f64 = 0.6;
const TYPE_WEIGHT: f64 = 0.4;

/// Jaccard index of two sets. Two empty sets score `empty`.
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>, empty: f64) -> f64 {
    if a.is_empty() && b.is_empty() {
        return empty;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Topic overlap. Documents without topics share nothing.
pub fn topic_similarity(a: &ContentAnalysis, b: &ContentAnalysis) -> f64 {
    jaccard(&a.topics, &b.topics, 0.0)
}

/// Heading overlap plus a bonus for matching format.
pub fn structure_similarity(a: &ContentAnalysis, b: &ContentAnalysis) -> f64 {
    let headings = jaccard(&a.structure.heading_set(), &b.structure.heading_set(), 1.0);
    let format = if a.structure.format == b.structure.format {
        1.0
    } else {
        0.0
    };
    HEADING_WEIGHT * headings + FORMAT_WEIGHT * format
}

/// Ratio of the smaller to the larger word count.
fn length_ratio(a: usize, b: usize) -> f64 {
    let max = a.max(b);
    if max == 0 {
        return 1.0;
    }
    1.0 - a.abs_diff(b) as f64 / max as f64
}

/// Length closeness plus a bonus for matching content type.
pub fn content_similarity(a: &ContentAnalysis, b: &ContentAnalysis) -> f64 {
    let same_type = if a.content_type == b.content_type {
        1.0
    } else {
        0.0
    };
    LENGTH_WEIGHT * length_ratio(a.word_count, b.word_count) + TYPE_WEIGHT * same_type
}

/// Weighted overall similarity in `[0, 1]`.
pub fn similarity(a: &ContentAnalysis, b: &ContentAnalysis) -> f64 {
    TOPIC_WEIGHT * topic_similarity(a, b)
        + STRUCTURE_WEIGHT * structure_similarity(a, b)
        + CONTENT_WEIGHT * content_similarity(a, b)
}

/// Highest similarity a pair with these word counts could reach.
///
/// Every other component is assumed to be perfect, so a pair whose bound
/// falls below the threshold can be skipped without computing the rest.
pub fn upper_bound(a_words: usize, b_words: usize) -> f64 {
    TOPIC_WEIGHT
        + STRUCTURE_WEIGHT
        + CONTENT_WEIGHT * (LENGTH_WEIGHT * length_ratio(a_words, b_words) + TYPE_WEIGHT)
}
