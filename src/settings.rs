//! CLI settings file.
//!
//! ```toml
//! [store]
//! root = "/home/me/corpus"
//! ignore_patterns = ["archive*"]
//!
//! [analyzer]
//! similarity_threshold = 0.85
//!
//! [search]
//! limit = 20
//!
//! [consolidate]
//! strategy = "structured"
//!
//! [categories]
//! Programming = ["rust", "python", "compiler"]
//! Cooking = ["flour", "oven"]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use dossier_analyze::AnalyzerConfig;
use dossier_core::{Error, Result, StoreConfig};
use dossier_merge::{ConsolidateOptions, KeywordCategories};
use dossier_search::SearchOptions;

/// Everything the CLI can be configured with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub store: StoreConfig,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub search: SearchOptions,
    #[serde(default)]
    pub consolidate: ConsolidateOptions,
    /// Keyword table used to place consolidated folders.
    #[serde(default)]
    pub categories: KeywordCategories,
}

impl Settings {
    /// Defaults for a corpus at `root`.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            store: StoreConfig::new(root),
            analyzer: AnalyzerConfig::default(),
            search: SearchOptions::default(),
            consolidate: ConsolidateOptions::default(),
            categories: KeywordCategories::default(),
        }
    }

    /// Parse settings from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(text).map_err(|e| Error::config(format!("invalid settings: {e}")))?;
        if settings.store.root.as_os_str().is_empty() {
            return Err(Error::config("store.root cannot be empty"));
        }
        Ok(settings)
    }

    /// Read settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io("read settings", path, e))?;
        Self::from_toml(&text).map_err(|e| match e {
            Error::Configuration { message } => Error::config(format!("{}: {message}", path.display())),
            other => other,
        })
    }

    /// Settings from an optional file, with `root` taking precedence.
    pub fn resolve(config: Option<&Path>, root: Option<PathBuf>) -> Result<Self> {
        match (config, root) {
            (Some(path), root) => {
                let mut settings = Self::load(path)?;
                if let Some(root) = root {
                    settings.store.root = root;
                }
                Ok(settings)
            }
            (None, Some(root)) => Ok(Self::for_root(root)),
            (None, None) => Err(Error::config(
                "no corpus root: pass --root or a settings file with [store] root",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_merge::{CategoryResolver, Strategy};
    use tempfile::TempDir;

    #[test]
    fn test_full_settings() {
        let settings = Settings::from_toml(
            r#"
            [store]
            root = "/corpus"
            max_depth = 3

            [analyzer]
            similarity_threshold = 0.9

            [search]
            limit = 25

            [consolidate]
            strategy = "comprehensive"
            dry_run = true

            [categories]
            Cooking = ["flour"]
            "#,
        )
        .unwrap();

        assert_eq!(settings.store.root, PathBuf::from("/corpus"));
        assert_eq!(settings.store.max_depth, Some(3));
        assert_eq!(settings.store.images_dir, "images");
        assert_eq!(settings.analyzer.similarity_threshold, 0.9);
        assert_eq!(settings.analyzer.min_content_length, 100);
        assert_eq!(settings.search.limit, 25);
        assert_eq!(settings.consolidate.strategy, Strategy::Comprehensive);
        assert!(settings.consolidate.dry_run);
        assert_eq!(
            settings.categories.resolve("bread", "more flour").as_deref(),
            Some("Cooking")
        );
    }

    #[test]
    fn test_missing_root_is_configuration_error() {
        let err = Settings::from_toml("[analyzer]\nmin_content_length = 10\n").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));

        let err = Settings::from_toml("[store]\nroot = \"\"\n").unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_resolve_precedence() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dossier.toml");
        fs::write(&path, "[store]\nroot = \"/from-file\"\n").unwrap();

        let from_file = Settings::resolve(Some(&path), None).unwrap();
        assert_eq!(from_file.store.root, PathBuf::from("/from-file"));

        let overridden = Settings::resolve(Some(&path), Some("/flag".into())).unwrap();
        assert_eq!(overridden.store.root, PathBuf::from("/flag"));

        assert!(matches!(
            Settings::resolve(None, None),
            Err(Error::Configuration { .. })
        ));
        assert!(matches!(
            Settings::resolve(Some(&temp.path().join("absent.toml")), None),
            Err(Error::NotFound { .. })
        ));
    }
}
