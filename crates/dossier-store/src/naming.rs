//! Folder name sanitizing and validation.

use std::path::{Path, PathBuf};

/// Characters that are unsafe in file names on at least one platform.
const UNSAFE_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Turn a free-form title into a folder name.
///
/// Strips unsafe characters and punctuation, collapses whitespace runs to
/// single hyphens, lowercases, and truncates to `max_len` characters.
/// `"My Doc!"` becomes `"my-doc"`.
pub fn sanitize_name(name: &str, max_len: usize) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_control() || UNSAFE_CHARS.contains(&c) {
            continue;
        }
        if c.is_whitespace() || c == '-' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
        } else if c.is_alphanumeric() || c == '_' || c == '.' {
            out.extend(c.to_lowercase());
        }
    }

    let trimmed = out.trim_matches(['-', '.']);
    let truncated: String = trimmed.chars().take(max_len).collect();
    truncated.trim_end_matches(['-', '.']).to_string()
}

/// Validate a filename for cross-platform compatibility.
pub fn validate_filename(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Name cannot be empty".into());
    }

    if name.len() > 255 {
        return Err("Name is too long (max 255 characters)".into());
    }

    for c in UNSAFE_CHARS.iter().chain(['\0'].iter()) {
        if name.contains(*c) {
            return Err(format!("Name cannot contain '{c}'"));
        }
    }

    if name.starts_with(' ') || name.ends_with(' ') {
        return Err("Name cannot start or end with spaces".into());
    }

    if name.ends_with('.') {
        return Err("Name cannot end with a dot".into());
    }

    if name == "." || name == ".." {
        return Err("'.' and '..' are reserved names".into());
    }

    Ok(())
}

/// Find a free sibling path for a folder name.
///
/// For "notes", tries "notes", "notes-2", "notes-3", etc.
pub fn unique_folder_path(parent: &Path, name: &str) -> PathBuf {
    let candidate = parent.join(name);
    if !candidate.exists() {
        return candidate;
    }

    for i in 2..1000 {
        let candidate = parent.join(format!("{name}-{i}"));
        if !candidate.exists() {
            return candidate;
        }
    }

    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    parent.join(format!("{name}-{timestamp}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("My Doc!", 100), "my-doc");
        assert_eq!(sanitize_name("  Spaces   everywhere  ", 100), "spaces-everywhere");
        assert_eq!(sanitize_name("a/b\\c:d", 100), "abcd");
        assert_eq!(sanitize_name("Rust -- Tips", 100), "rust-tips");
        assert_eq!(sanitize_name("v1.2 notes.", 100), "v1.2-notes");
    }

    #[test]
    fn test_sanitize_truncates() {
        let long = "word ".repeat(50);
        let name = sanitize_name(&long, 12);
        assert!(name.chars().count() <= 12);
        assert!(!name.ends_with('-'));
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize_name("!!!", 100), "");
    }

    #[test]
    fn test_validate_filename_valid() {
        assert!(validate_filename("notes").is_ok());
        assert!(validate_filename("my-file").is_ok());
        assert!(validate_filename("file with spaces").is_ok());
    }

    #[test]
    fn test_validate_filename_invalid() {
        assert!(validate_filename("").is_err());
        assert!(validate_filename("test/file").is_err());
        assert!(validate_filename("..").is_err());
        assert!(validate_filename("file ").is_err());
        assert!(validate_filename("file.").is_err());
        assert!(validate_filename("a|b").is_err());
    }

    #[test]
    fn test_unique_folder_path() {
        let temp = tempfile::TempDir::new().unwrap();
        let first = unique_folder_path(temp.path(), "notes");
        assert_eq!(first, temp.path().join("notes"));

        std::fs::create_dir(&first).unwrap();
        let second = unique_folder_path(temp.path(), "notes");
        assert_eq!(second, temp.path().join("notes-2"));
    }
}
