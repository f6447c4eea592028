use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use dossier_core::markdown::{self, ImageRef};
use dossier_core::{
    ContentHash, DocumentFolder, Error, StoreConfig, Timestamps, Warning, WarningKind,
};

#[test]
fn test_content_hash_creation_and_hex() {
    let hash = ContentHash::new([0xab; 32]);

    let hex = hash.to_hex();
    assert_eq!(hex.len(), 64);
    assert!(hex.starts_with("ab"));
    assert_eq!(hash.short(), "abababababab");
    assert_eq!(hash.to_string(), hex);

    assert_eq!(hash, ContentHash::new([0xab; 32]));
    assert_ne!(hash, ContentHash::new([0xcd; 32]));
}

#[test]
fn test_document_folder_helpers() {
    let folder = DocumentFolder {
        path: PathBuf::from("/corpus/Notes/recipe"),
        name: "recipe".into(),
        category: "Notes".into(),
        main_file: PathBuf::from("/corpus/Notes/recipe/index.md"),
        images_dir: PathBuf::from("/corpus/Notes/recipe/images"),
        size: 120,
        timestamps: Timestamps::new(SystemTime::now(), None),
        image_count: 0,
    };

    assert!(!folder.has_images());
    assert!(!folder.is_normalized());
    assert_eq!(folder.main_extension(), Some("md"));

    let normalized = DocumentFolder {
        main_file: PathBuf::from("/corpus/Notes/recipe/recipe.md"),
        image_count: 2,
        ..folder
    };
    assert!(normalized.is_normalized());
    assert!(normalized.has_images());
}

#[test]
fn test_store_config_builder() {
    let config = StoreConfig::builder()
        .root("/corpus")
        .max_depth(Some(2usize))
        .build()
        .unwrap();

    assert_eq!(config.root, PathBuf::from("/corpus"));
    assert_eq!(config.images_dir, "images");
    assert_eq!(config.main_extension, "md");
    assert_eq!(config.max_depth, Some(2));

    assert!(StoreConfig::builder().build().is_err());
    assert!(StoreConfig::builder().root("").build().is_err());
}

#[test]
fn test_error_taxonomy() {
    let missing = Error::io(
        "read main file",
        "/corpus/x.md",
        std::io::Error::from(std::io::ErrorKind::NotFound),
    );
    assert!(matches!(missing, Error::NotFound { .. }));

    let denied = Error::io(
        "read main file",
        "/corpus/x.md",
        std::io::Error::from(std::io::ErrorKind::PermissionDenied),
    );
    assert!(matches!(denied, Error::Io { operation: "read main file", .. }));
    assert!(denied.to_string().contains("/corpus/x.md"));

    let timeout = Error::Timeout {
        operation: "enhance".into(),
        after: Duration::from_secs(30),
    };
    assert!(timeout.is_retryable());
    assert!(!Error::validation("bad").is_retryable());
}

#[test]
fn test_warning_serializes_kind() {
    let warning = Warning::new("/corpus/a", "cannot read", WarningKind::ReadError);
    let json = serde_json::to_value(&warning).unwrap();
    assert_eq!(json["kind"], "read_error");
    assert_eq!(json["message"], "cannot read");
}

#[test]
fn test_markdown_markers() {
    let text = "# Title\n\n```rust\n# not a heading\n```\n\n- item\n| a | b |\n";
    let headings: Vec<_> = markdown::lines(text).filter_map(|l| l.heading()).collect();
    assert_eq!(headings, vec![(1, "Title")]);

    assert_eq!(markdown::fence_language("```rust"), Some("rust"));
    assert!(markdown::is_bullet("- item"));
    assert!(markdown::is_bullet("12. item"));
    assert!(markdown::is_table_row("| a | b |"));
    assert_eq!(markdown::heading("## Setup ##"), Some((2, "Setup")));
    assert_eq!(markdown::heading("#hashtag"), None);
}

#[test]
fn test_image_refs_and_links() {
    let text = "See ![map](images/map.png \"Map\") and [docs](https://example.com).";

    assert_eq!(
        markdown::image_refs(text),
        vec![ImageRef {
            alt: "map".into(),
            path: "images/map.png".into(),
        }]
    );
    let links = markdown::links(text);
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].url, "https://example.com");

    let (rewritten, count) =
        markdown::rewrite_image_refs(text, |p| (p == "images/map.png").then(|| "images/m2.png".into()));
    assert_eq!(count, 1);
    assert!(rewritten.contains("![map](images/m2.png \"Map\")"));
}

#[test]
fn test_front_matter() {
    let text = "---\ntitle: \"Notes\"\nauthor: Ada\n---\n# Body\n";
    let (front, body) = markdown::split_front_matter(text);
    let front = front.unwrap();

    assert_eq!(markdown::front_matter_value(front, "title").as_deref(), Some("Notes"));
    assert_eq!(markdown::front_matter_value(front, "Author").as_deref(), Some("Ada"));
    assert_eq!(body, "# Body\n");
    assert_eq!(markdown::split_front_matter("# No front\n").0, None);
}

#[test]
fn test_normalization_and_sentences() {
    assert_eq!(
        markdown::normalize_text("Hello,   WORLD!\nIt's  here."),
        markdown::normalize_text("hello world its here")
    );
    assert_eq!(
        markdown::split_sentences("One. Two? Version 1.2 ships! tail"),
        vec!["One.", "Two?", "Version 1.2 ships!", "tail"]
    );
}
