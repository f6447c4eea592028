//! Copying source images and rewriting references to them.

use std::collections::HashMap;
use std::path::Path;

use tracing::warn;

use dossier_core::markdown;
use dossier_core::{Warning, WarningKind};
use dossier_store::FsOps;

use crate::source::SourceDocument;

/// Outcome of copying images into the target folder.
#[derive(Debug, Default)]
pub struct ImageCopies {
    /// Reference path as a source might write it, mapped to the new path.
    rewrites: HashMap<String, String>,
    /// Number of files copied.
    pub copied: usize,
    pub warnings: Vec<Warning>,
}

impl ImageCopies {
    /// Rewrite every reference to a copied image. Returns the new text and
    /// the number of references changed.
    pub fn rewrite(&self, text: &str) -> (String, usize) {
        markdown::rewrite_image_refs(text, |path| {
            self.rewrites.get(path.trim()).cloned()
        })
    }
}

/// Copy every source image into `target_images`.
///
/// Same-named images from different sources are not deduplicated: the
/// last copy wins.
pub fn copy_images(
    ops: &FsOps,
    sources: &[SourceDocument],
    images_dir: &str,
    target_images: &Path,
) -> ImageCopies {
    let mut copies = ImageCopies::default();

    for source in sources {
        for image in &source.images {
            let Some(file) = image.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            let destination = target_images.join(&file);
            if let Err(e) = ops.copy(image, &destination) {
                warn!(image = %image.display(), error = %e, "failed to copy image");
                copies
                    .warnings
                    .push(Warning::new(image, e.to_string(), WarningKind::ImageCopy));
                continue;
            }
            copies.copied += 1;

            let new_path = format!("{images_dir}/{file}");
            for key in reference_forms(&source.name, images_dir, &file, image) {
                copies.rewrites.insert(key, new_path.clone());
            }
        }
    }
    copies
}

/// Ways a source document may refer to one of its images.
fn reference_forms(source: &str, images_dir: &str, file: &str, absolute: &Path) -> Vec<String> {
    vec![
        format!("{images_dir}/{file}"),
        format!("./{images_dir}/{file}"),
        format!("{source}/{images_dir}/{file}"),
        format!("../{source}/{images_dir}/{file}"),
        absolute.to_string_lossy().into_owned(),
    ]
}
