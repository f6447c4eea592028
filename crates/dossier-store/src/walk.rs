//! Document folder discovery.

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::GlobSet;
use jwalk::{Parallelism, WalkDirGeneric};
use tracing::{debug, warn};

use dossier_core::{StoreConfig, Warning, WarningKind};

use crate::resolve::resolve_main_file;

/// Folders found by a traversal, plus anything that went wrong on the way.
#[derive(Debug, Clone, Default)]
pub struct FolderScan {
    /// Document folders in depth-first, name-sorted order.
    pub folders: Vec<PathBuf>,
    /// Non-fatal traversal problems.
    pub warnings: Vec<Warning>,
    /// The visitor stopped the traversal before it was exhausted.
    pub stopped_early: bool,
}

/// Walk `root` depth-first and hand every document folder to `visit`.
///
/// A directory that qualifies as a document folder is yielded and never
/// descended into. Other directories are descended into only when
/// `recursive` is set, bounded by the configured maximum depth. The root
/// itself is never yielded. Returning `Break` from `visit` ends the walk;
/// the folder it was given is still recorded.
pub(crate) fn walk_document_folders(
    config: &Arc<StoreConfig>,
    ignore: &GlobSet,
    root: &Path,
    recursive: bool,
    mut visit: impl FnMut(&Path, &mut Vec<Warning>) -> ControlFlow<()>,
) -> FolderScan {
    let max_depth = if recursive {
        config.max_depth.unwrap_or(usize::MAX)
    } else {
        1
    };

    let prune_config = Arc::clone(config);
    let prune_ignore = ignore.clone();

    // Client state marks entries that are document folders.
    let walker = WalkDirGeneric::<((), bool)>::new(root)
        .parallelism(Parallelism::Serial)
        .sort(true)
        .skip_hidden(!config.include_hidden)
        .follow_links(false)
        .min_depth(1)
        .max_depth(max_depth)
        .process_read_dir(move |_depth, _path, _state, children| {
            children.retain(|child| match child {
                Ok(entry) => {
                    let name = entry.file_name.to_string_lossy();
                    entry.file_type.is_dir()
                        && name != prune_config.images_dir.as_str()
                        && !prune_ignore.is_match(name.as_ref())
                }
                Err(_) => true,
            });
            for entry in children.iter_mut().flatten() {
                if resolve_main_file(&prune_config, &entry.path()).is_some() {
                    entry.client_state = true;
                    entry.read_children_path = None;
                }
            }
        });

    let mut scan = FolderScan::default();
    for entry in walker {
        match entry {
            Ok(entry) if entry.client_state => {
                let path = entry.path();
                let flow = visit(&path, &mut scan.warnings);
                scan.folders.push(path);
                if flow.is_break() {
                    scan.stopped_early = true;
                    break;
                }
            }
            Ok(_) => {}
            Err(err) => {
                let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                warn!(path = %path.display(), error = %err, "traversal error");
                scan.warnings
                    .push(Warning::new(path, err.to_string(), WarningKind::ReadError));
            }
        }
    }

    debug!(
        root = %root.display(),
        found = scan.folders.len(),
        stopped_early = scan.stopped_early,
        "document folder traversal complete"
    );
    scan
}
