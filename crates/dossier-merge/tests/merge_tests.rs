use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dossier_core::markdown;
use dossier_merge::{
    BoxFuture, ConsolidateOptions, Consolidator, ContentEnhancer, EnhancementOutcome, Error,
    KeywordCategories, Strategy, WarningKind,
};
use dossier_store::{DocumentStore, FsOperation, StoreConfig};
use futures::FutureExt;
use tempfile::TempDir;

fn create_store() -> (TempDir, DocumentStore) {
    let temp = TempDir::new().unwrap();
    let store = DocumentStore::new(StoreConfig::new(temp.path())).unwrap();
    (temp, store)
}

/// Every file below `root` with its content.
fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    fn walk(dir: &Path, out: &mut BTreeMap<PathBuf, Vec<u8>>) {
        for entry in fs::read_dir(dir).unwrap().flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(&path, out);
            } else {
                out.insert(path.clone(), fs::read(&path).unwrap());
            }
        }
    }
    let mut out = BTreeMap::new();
    walk(root, &mut out);
    out
}

fn parts(store: &DocumentStore) -> Vec<PathBuf> {
    vec![
        store
            .create_document_folder("Part 1", "Notes", "# Part 1\n\nFirst part content.\n")
            .unwrap(),
        store
            .create_document_folder("Part 2", "Notes", "# Part 2\n\nSecond part content.\n")
            .unwrap(),
    ]
}

#[tokio::test]
async fn test_simple_strategy_table_of_contents() {
    let (temp, store) = create_store();
    let sources = parts(&store);

    let report = Consolidator::new(&store)
        .consolidate(&sources, "parts", &ConsolidateOptions::default())
        .await
        .unwrap();

    assert_eq!(report.target, temp.path().join("Consolidated/parts"));
    assert_eq!(report.category, "Consolidated");
    assert_eq!(report.strategy, Strategy::Simple);
    let merged = fs::read_to_string(&report.main_file).unwrap();
    let toc: Vec<&str> = merged.lines().filter(|l| l.contains("](#")).collect();
    assert_eq!(toc, vec!["1. [Part 1](#part-1)", "2. [Part 2](#part-2)"]);
    assert!(merged.lines().any(|l| l == "## Part 1"));
    assert!(merged.lines().any(|l| l == "## Part 2"));
    assert!(merged.contains("First part content."));
    assert!(merged.contains("## Consolidation Metadata"));
    assert_eq!(store.get_main_document_file(&report.target), Some(report.main_file.clone()));
}

#[tokio::test]
async fn test_sources_are_left_untouched() {
    let (temp, store) = create_store();
    let sources = parts(&store);
    fs::write(sources[0].join("images/photo.jpg"), [1u8, 2, 3]).unwrap();
    let before = snapshot(&temp.path().join("Notes"));

    for strategy in [Strategy::Simple, Strategy::Structured, Strategy::Comprehensive] {
        let options = ConsolidateOptions {
            strategy,
            ..ConsolidateOptions::default()
        };
        Consolidator::new(&store)
            .consolidate(&sources, "parts", &options)
            .await
            .unwrap();
    }

    assert_eq!(snapshot(&temp.path().join("Notes")), before);
}

#[tokio::test]
async fn test_images_are_copied_and_references_rewritten() {
    let (_temp, store) = create_store();
    let trip = store
        .create_document_folder(
            "Trip",
            "Travel",
            "# Trip\n\n![map](images/map.png)\n\nWe walked.\n\n![again](./images/map.png)\n",
        )
        .unwrap();
    fs::write(trip.join("images/map.png"), [0u8; 8]).unwrap();
    let hike = store
        .create_document_folder(
            "Hike",
            "Travel",
            "# Hike\n\nA nice hike.\n\n![remote](https://example.com/x.png)\n",
        )
        .unwrap();

    let report = Consolidator::new(&store)
        .consolidate(&[trip, hike], "outdoors", &ConsolidateOptions::default())
        .await
        .unwrap();

    assert_eq!(report.images_copied, 1);
    assert_eq!(report.references_rewritten, 2);
    assert!(report.target.join("images/map.png").is_file());

    let merged = fs::read_to_string(&report.main_file).unwrap();
    for reference in markdown::image_refs(&merged) {
        if reference.path.starts_with("http") {
            continue;
        }
        assert!(
            report.target.join(&reference.path).is_file(),
            "dangling reference {}",
            reference.path
        );
    }
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let (temp, store) = create_store();
    let sources = parts(&store);
    fs::write(sources[1].join("images/chart.png"), [0u8; 4]).unwrap();
    let before = snapshot(temp.path());

    let options = ConsolidateOptions {
        dry_run: true,
        ..ConsolidateOptions::default()
    };
    let report = Consolidator::new(&store)
        .consolidate(&sources, "parts", &options)
        .await
        .unwrap();

    assert!(report.dry_run);
    assert!(!report.target.exists());
    assert_eq!(snapshot(temp.path()), before);
    assert_eq!(report.images_copied, 1);
    assert!(report.operations.contains(&FsOperation::CreateDirectory {
        path: report.target.clone()
    }));
    assert!(
        report
            .operations
            .iter()
            .any(|op| matches!(op, FsOperation::WriteFile { path, .. } if *path == report.main_file))
    );
}

#[tokio::test]
async fn test_input_validation() {
    let (temp, store) = create_store();
    let consolidator = Consolidator::new(&store);
    let options = ConsolidateOptions::default();

    let empty = consolidator.consolidate(&[], "topic", &options).await.unwrap_err();
    assert!(matches!(empty, Error::Validation { .. }));

    let sources = parts(&store);
    let no_topic = consolidator.consolidate(&sources, "  ", &options).await.unwrap_err();
    assert!(matches!(no_topic, Error::Validation { .. }));

    let missing = vec![temp.path().join("Notes/nope"), temp.path().join("Notes/gone")];
    let unreadable = consolidator.consolidate(&missing, "topic", &options).await.unwrap_err();
    assert!(matches!(unreadable, Error::ContentProcessing { .. }));
}

#[tokio::test]
async fn test_unreadable_sources_are_skipped() {
    let (temp, store) = create_store();
    let mut sources = parts(&store);
    let missing = temp.path().join("Notes/missing");
    sources.push(missing.clone());

    let report = Consolidator::new(&store)
        .consolidate(&sources, "parts", &ConsolidateOptions::default())
        .await
        .unwrap();

    assert_eq!(report.sources.len(), 2);
    assert_eq!(report.skipped_sources.len(), 1);
    assert_eq!(report.skipped_sources[0].path, missing);
    assert!(report.warnings.iter().any(|w| w.kind == WarningKind::SkippedSource));
}

#[tokio::test]
async fn test_name_collision_gets_suffix() {
    let (temp, store) = create_store();
    let sources = parts(&store);
    let consolidator = Consolidator::new(&store);
    let options = ConsolidateOptions::default();

    let first = consolidator.consolidate(&sources, "parts", &options).await.unwrap();
    let second = consolidator.consolidate(&sources, "parts", &options).await.unwrap();

    assert_eq!(first.target, temp.path().join("Consolidated/parts"));
    assert_eq!(second.target, temp.path().join("Consolidated/parts-2"));
    assert!(second.main_file.ends_with("parts-2.md"));
}

#[tokio::test]
async fn test_category_option_and_resolver() {
    let (temp, store) = create_store();
    let bread = store
        .create_document_folder("Bread", "Food", "# Bread\n\nMix flour and water.\n")
        .unwrap();
    let cake = store
        .create_document_folder("Cake", "Food", "# Cake\n\nSift the flour twice.\n")
        .unwrap();
    let sources = vec![bread, cake];

    let resolved = Consolidator::new(&store)
        .with_category_resolver(KeywordCategories::new().with_category("Cooking", ["flour"]))
        .consolidate(&sources, "baking", &ConsolidateOptions::default())
        .await
        .unwrap();
    assert_eq!(resolved.category, "Cooking");
    assert_eq!(resolved.target, temp.path().join("Cooking/baking"));

    let explicit = ConsolidateOptions::builder()
        .category("Recipes")
        .target_name("Baking Basics")
        .build()
        .unwrap();
    let report = Consolidator::new(&store)
        .consolidate(&sources, "baking", &explicit)
        .await
        .unwrap();
    assert_eq!(report.target, temp.path().join("Recipes/baking-basics"));
}

#[tokio::test]
async fn test_structured_pools_themes_and_code() {
    let (_temp, store) = create_store();
    let a = store
        .create_document_folder(
            "Setup A",
            "Guides",
            "# Setup A\n\n## Installation\n\nRun the installer.\n\n```sh\nmake install\n```\n\nSee [docs](https://example.com/docs).\n",
        )
        .unwrap();
    let b = store
        .create_document_folder(
            "Setup B",
            "Guides",
            "# Setup B\n\n## installation\n\nUse the package manager.\n",
        )
        .unwrap();
    let options = ConsolidateOptions {
        strategy: Strategy::Structured,
        ..ConsolidateOptions::default()
    };

    let report = Consolidator::new(&store)
        .consolidate(&[a, b], "setup", &options)
        .await
        .unwrap();
    let merged = fs::read_to_string(&report.main_file).unwrap();

    assert_eq!(merged.matches("## Installation").count(), 1);
    assert!(merged.contains("*From Setup A:*\n\nRun the installer."));
    assert!(merged.contains("*From Setup B:*\n\nUse the package manager."));
    assert!(merged.contains("## Code Examples"));
    assert!(merged.contains("### sh (from Setup A)"));
    assert!(merged.contains("make install"));
    assert!(merged.contains("## References"));
    assert!(merged.contains("- [docs](https://example.com/docs) (from Setup A)"));
}

#[tokio::test]
async fn test_comprehensive_removes_cross_source_sentences() {
    let (_temp, store) = create_store();
    let shared = "Containers package applications with their dependencies.";
    let a = store
        .create_document_folder(
            "Containers",
            "Ops",
            &format!("# Containers\n\n{shared} Docker builds images from files.\n"),
        )
        .unwrap();
    let b = store
        .create_document_folder(
            "Orchestration",
            "Ops",
            &format!("# Orchestration\n\n{shared} Kubernetes schedules pods across nodes.\n"),
        )
        .unwrap();
    let options = ConsolidateOptions {
        strategy: Strategy::Comprehensive,
        ..ConsolidateOptions::default()
    };

    let report = Consolidator::new(&store)
        .consolidate(&[a, b], "containers", &options)
        .await
        .unwrap();
    let merged = fs::read_to_string(&report.main_file).unwrap();

    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(merged.matches(shared).count(), 1);
    assert!(merged.contains("Kubernetes schedules pods across nodes."));
    assert!(merged.contains("## Executive Summary"));
    assert!(merged.contains("## Source Files"));
}

struct Marker;

impl ContentEnhancer for Marker {
    fn enhance<'a>(&'a self, _topic: &'a str, text: &'a str) -> BoxFuture<'a, dossier_merge::Result<String>> {
        async move { Ok(format!("{text}\n<!-- enhanced -->\n")) }.boxed()
    }
}

struct Offline;

impl ContentEnhancer for Offline {
    fn enhance<'a>(&'a self, _topic: &'a str, _text: &'a str) -> BoxFuture<'a, dossier_merge::Result<String>> {
        async {
            Err(Error::Network {
                message: "service unreachable".into(),
            })
        }
        .boxed()
    }
}

#[tokio::test]
async fn test_enhancement_requires_enhancer() {
    let (_temp, store) = create_store();
    let sources = parts(&store);
    let options = ConsolidateOptions {
        enhance: true,
        ..ConsolidateOptions::default()
    };

    let err = Consolidator::new(&store)
        .consolidate(&sources, "parts", &options)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Configuration { .. }));
}

#[tokio::test]
async fn test_enhancement_applied() {
    let (_temp, store) = create_store();
    let sources = parts(&store);
    let options = ConsolidateOptions {
        enhance: true,
        ..ConsolidateOptions::default()
    };

    let report = Consolidator::new(&store)
        .with_enhancer(Arc::new(Marker))
        .consolidate(&sources, "parts", &options)
        .await
        .unwrap();

    assert_eq!(report.enhancement, EnhancementOutcome::Applied { attempts: 1 });
    let merged = fs::read_to_string(&report.main_file).unwrap();
    assert!(merged.contains("<!-- enhanced -->"));
}

#[tokio::test]
async fn test_enhancement_falls_back_to_merged_text() {
    let (_temp, store) = create_store();
    let sources = parts(&store);
    let options = ConsolidateOptions {
        enhance: true,
        enhance_attempts: 2,
        enhance_backoff_ms: 1,
        ..ConsolidateOptions::default()
    };

    let report = Consolidator::new(&store)
        .with_enhancer(Arc::new(Offline))
        .consolidate(&sources, "parts", &options)
        .await
        .unwrap();

    assert!(matches!(report.enhancement, EnhancementOutcome::FellBack { attempts: 2, .. }));
    assert!(report.warnings.iter().any(|w| w.kind == WarningKind::EnhancementFailed));
    let merged = fs::read_to_string(&report.main_file).unwrap();
    assert!(merged.contains("First part content."));
}

#[tokio::test]
async fn test_consolidate_candidate_from_main_files() {
    let (_temp, store) = create_store();
    let sources = parts(&store);
    let candidate = dossier_analyze::ConsolidationCandidate {
        topic: "part".to_string(),
        paths: sources
            .iter()
            .map(|s| store.get_main_document_file(s).unwrap())
            .collect(),
        mean_similarity: 0.9,
        strategy: Strategy::Structured,
        recommended_title: "Part".to_string(),
        total_words: 6,
    };

    let report = Consolidator::new(&store)
        .consolidate_candidate(&candidate, &ConsolidateOptions::default())
        .await
        .unwrap();

    assert_eq!(report.strategy, Strategy::Structured);
    assert_eq!(report.sources, sources);
    assert!(report.target.ends_with("part"));
}

#[tokio::test]
async fn test_loose_files_in_one_folder_keep_their_own_content() {
    let (temp, store) = create_store();
    let mixed = temp.path().join("Notes/mixed");
    fs::create_dir_all(&mixed).unwrap();
    let alpha = mixed.join("alpha.md");
    let beta = mixed.join("beta.md");
    fs::write(&alpha, "# Alpha\n\nAlpha body text.\n").unwrap();
    fs::write(&beta, "# Beta\n\nBeta body text.\n").unwrap();

    let report = Consolidator::new(&store)
        .consolidate(&[alpha, beta.clone()], "mixed", &ConsolidateOptions::default())
        .await
        .unwrap();

    assert_eq!(report.sources, vec![mixed, beta]);
    let merged = fs::read_to_string(&report.main_file).unwrap();
    let toc: Vec<&str> = merged.lines().filter(|l| l.contains("](#")).collect();
    assert_eq!(toc, vec!["1. [Alpha](#alpha)", "2. [Beta](#beta)"]);
    assert_eq!(merged.matches("Alpha body text.").count(), 1);
    assert!(merged.contains("Beta body text."));
}
