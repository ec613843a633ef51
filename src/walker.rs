use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{MirrorError, Result};

/// One filesystem node found while walking a tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Path of the node, rooted at the walk root as given
    pub path: PathBuf,

    /// Size reported by the filesystem. Not meaningful for directories.
    pub size: u64,

    pub is_dir: bool,

    /// The node is a symlink. `size` and `is_dir` then describe the link itself.
    pub is_symlink: bool,
}

/// Order in which the walker yields entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalkOrder {
    /// Each directory before its contents; the root is the first entry
    #[default]
    RootFirst,

    /// Each directory after its contents; the root is the last entry
    ContentsFirst,
}

/// An entry that was skipped because it could not be read or mirrored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkWarning {
    pub path: Option<PathBuf>,
    pub message: String,
}

/// Result of a full tree walk
#[derive(Debug, Default)]
pub struct Walk {
    pub entries: Vec<Entry>,

    /// Entries skipped because of per-entry failures
    pub warnings: Vec<WalkWarning>,
}

impl Walk {
    /// Number of non-directory entries, used as the progress total
    pub fn file_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_dir).count()
    }
}

/// Recursively enumerate `root`, depth-first, without following symlinks
///
/// The order between siblings is whatever the filesystem returns. A missing root
/// or a failure to read the root itself aborts the walk with [`MirrorError::Walk`].
/// Failures below the root are logged, recorded in [`Walk::warnings`] and skipped.
pub fn walk_tree(root: &Path, order: WalkOrder) -> Result<Walk> {
    fs::metadata(root).map_err(|source| MirrorError::Walk {
        path: root.to_path_buf(),
        source,
    })?;

    let mut walk = Walk::default();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .contents_first(order == WalkOrder::ContentsFirst);

    for item in walker {
        let dir_entry = match item {
            Ok(dir_entry) => dir_entry,
            Err(err) if err.depth() == 0 => {
                let path = err.path().unwrap_or(root).to_path_buf();
                let source = walkdir_to_io(err);
                return Err(MirrorError::Walk { path, source });
            }
            Err(err) => {
                let path = err.path().map(Path::to_path_buf);
                log::warn!(
                    "Skipping unreadable entry {}: {}",
                    path.as_deref().unwrap_or(root).display(),
                    err
                );
                walk.warnings.push(WalkWarning {
                    path,
                    message: err.to_string(),
                });
                continue;
            }
        };

        let metadata = match dir_entry.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                log::warn!("Failed to stat {}: {}", dir_entry.path().display(), err);
                walk.warnings.push(WalkWarning {
                    path: Some(dir_entry.path().to_path_buf()),
                    message: err.to_string(),
                });
                continue;
            }
        };

        walk.entries.push(Entry {
            is_symlink: dir_entry.path_is_symlink(),
            path: dir_entry.into_path(),
            size: metadata.len(),
            is_dir: metadata.is_dir(),
        });
    }

    log::debug!(
        "Walked {}: {} entries, {} skipped",
        root.display(),
        walk.entries.len(),
        walk.warnings.len()
    );

    Ok(walk)
}

fn walkdir_to_io(err: walkdir::Error) -> io::Error {
    let message = err.to_string();
    err.into_io_error()
        .unwrap_or_else(|| io::Error::other(message))
}
