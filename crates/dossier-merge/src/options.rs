//! Consolidation options.

use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use dossier_analyze::Strategy;

/// Options for one consolidation run.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ConsolidateOptions {
    /// Layout of the merged document.
    #[builder(default)]
    #[serde(default)]
    pub strategy: Strategy,

    /// Plan every step without touching the disk.
    #[builder(default)]
    #[serde(default)]
    pub dry_run: bool,

    /// Category for the new folder. Resolved from content when unset.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub category: Option<String>,

    /// Folder name for the new folder. Derived from the topic when unset.
    #[builder(default, setter(into, strip_option))]
    #[serde(default)]
    pub target_name: Option<String>,

    /// Run the merged text through the configured enhancer.
    #[builder(default)]
    #[serde(default)]
    pub enhance: bool,

    /// Enhancement attempts before falling back to the unmodified text.
    #[builder(default = "3")]
    #[serde(default = "default_enhance_attempts")]
    pub enhance_attempts: u32,

    /// Time limit for a single enhancement attempt, in seconds.
    #[builder(default = "30")]
    #[serde(default = "default_enhance_timeout_secs")]
    pub enhance_timeout_secs: u64,

    /// Delay before the first retry, in milliseconds. Doubles per attempt.
    #[builder(default = "500")]
    #[serde(default = "default_enhance_backoff_ms")]
    pub enhance_backoff_ms: u64,
}

fn default_enhance_attempts() -> u32 {
    3
}

fn default_enhance_timeout_secs() -> u64 {
    30
}

fn default_enhance_backoff_ms() -> u64 {
    500
}

impl Default for ConsolidateOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            dry_run: false,
            category: None,
            target_name: None,
            enhance: false,
            enhance_attempts: default_enhance_attempts(),
            enhance_timeout_secs: default_enhance_timeout_secs(),
            enhance_backoff_ms: default_enhance_backoff_ms(),
        }
    }
}

impl ConsolidateOptionsBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.enhance_attempts == Some(0) {
            return Err("enhance_attempts must be at least 1".into());
        }
        Ok(())
    }
}

impl ConsolidateOptions {
    /// Create a new options builder.
    pub fn builder() -> ConsolidateOptionsBuilder {
        ConsolidateOptionsBuilder::default()
    }

    /// Per-attempt enhancement timeout.
    pub fn enhance_timeout(&self) -> Duration {
        Duration::from_secs(self.enhance_timeout_secs)
    }

    /// Initial retry delay.
    pub fn enhance_backoff(&self) -> Duration {
        Duration::from_millis(self.enhance_backoff_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let options = ConsolidateOptions::builder()
            .strategy(Strategy::Structured)
            .category("Guides")
            .build()
            .unwrap();
        assert_eq!(options.strategy, Strategy::Structured);
        assert_eq!(options.category.as_deref(), Some("Guides"));
        assert_eq!(options.enhance_attempts, 3);
        assert!(!options.dry_run);
    }

    #[test]
    fn test_zero_attempts_rejected() {
        assert!(ConsolidateOptions::builder().enhance_attempts(0u32).build().is_err());
    }
}
