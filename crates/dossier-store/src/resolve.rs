//! Main file resolution.

use std::fs;
use std::path::{Path, PathBuf};

use dossier_core::StoreConfig;

/// Image file extensions counted as folder images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg", "webp", "bmp", "tiff"];

/// Check whether a path has an image extension.
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|i| i.eq_ignore_ascii_case(ext)))
}

/// Folder name as a string (lossy for non-UTF-8 names).
pub fn folder_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Document files directly inside `dir`, sorted by file name.
fn document_files(config: &StoreConfig, dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter(|entry| !config.should_skip_hidden(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| config.is_document_extension(ext))
        })
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    files
}

fn stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or("")
}

/// Resolve the main file of a directory without touching the disk.
///
/// Order: `{folder}.{main_ext}`, then `{folder}.{any doc ext}`, then a
/// canonical name (`main`, `document`, `index` by default), then the
/// alphabetically first document file.
pub fn resolve_main_file(config: &StoreConfig, dir: &Path) -> Option<PathBuf> {
    if !dir.is_dir() {
        return None;
    }

    let name = folder_name(dir);
    let preferred = dir.join(format!("{name}.{}", config.main_extension()));
    if preferred.is_file() {
        return Some(preferred);
    }

    let files = document_files(config, dir);
    if let Some(exact) = files.iter().find(|f| stem(f) == name) {
        return Some(exact.clone());
    }

    for canonical in &config.canonical_names {
        if let Some(found) = files.iter().find(|f| stem(f).eq_ignore_ascii_case(canonical)) {
            return Some(found.clone());
        }
    }

    files.into_iter().next()
}

/// Path the main file should have once normalized.
pub fn normalized_main_path(dir: &Path, current: &Path) -> PathBuf {
    let name = folder_name(dir);
    match current.extension().and_then(|e| e.to_str()) {
        Some(ext) => dir.join(format!("{name}.{ext}")),
        None => dir.join(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn folder_with(files: &[&str]) -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("guide");
        fs::create_dir(&dir).unwrap();
        for f in files {
            fs::write(dir.join(f), "content").unwrap();
        }
        (temp, dir)
    }

    #[test]
    fn test_prefers_folder_named_file() {
        let (_t, dir) = folder_with(&["index.md", "guide.md"]);
        let config = StoreConfig::new(dir.parent().unwrap());
        assert_eq!(resolve_main_file(&config, &dir), Some(dir.join("guide.md")));
    }

    #[test]
    fn test_canonical_name() {
        let (_t, dir) = folder_with(&["aaa.txt", "index.md"]);
        let config = StoreConfig::new(dir.parent().unwrap());
        assert_eq!(resolve_main_file(&config, &dir), Some(dir.join("index.md")));
    }

    #[test]
    fn test_alphabetical_fallback() {
        let (_t, dir) = folder_with(&["zeta.md", "alpha.txt", "photo.png"]);
        let config = StoreConfig::new(dir.parent().unwrap());
        assert_eq!(resolve_main_file(&config, &dir), Some(dir.join("alpha.txt")));
    }

    #[test]
    fn test_no_document_files() {
        let (_t, dir) = folder_with(&["photo.png"]);
        let config = StoreConfig::new(dir.parent().unwrap());
        assert_eq!(resolve_main_file(&config, &dir), None);
    }

    #[test]
    fn test_normalized_main_path() {
        let dir = PathBuf::from("/c/guide");
        assert_eq!(
            normalized_main_path(&dir, &dir.join("index.txt")),
            dir.join("guide.txt")
        );
    }

    #[test]
    fn test_is_image() {
        assert!(is_image(Path::new("a/b.PNG")));
        assert!(!is_image(Path::new("a/b.md")));
    }
}
