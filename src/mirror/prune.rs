use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::denylist::Denylist;
use crate::error::Result;
use crate::processed::ProcessedSet;
use crate::progress::ProgressReporter;
use crate::transfer::remove_entry;
use crate::walker::{walk_tree, WalkOrder, WalkWarning};

use super::log_key;

/// Whether a prune run deletes matches or only reports them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PruneMode {
    /// Report matches, remove nothing
    Check,
    Delete,
}

impl PruneMode {
    pub fn from_check_flag(check: bool) -> Self {
        if check {
            PruneMode::Check
        } else {
            PruneMode::Delete
        }
    }
}

/// A path the denylist matched during a prune run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PruneCandidate {
    pub path: PathBuf,
    pub is_dir: bool,

    /// Denylist pattern that matched
    pub pattern: String,
}

/// Outcome of a prune run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PruneReport {
    pub mode: PruneMode,
    pub walked: usize,

    /// Matches in the order they were decided
    pub candidates: Vec<PruneCandidate>,

    /// Entries actually removed; always zero in check mode
    pub removed: usize,

    pub warnings: Vec<WalkWarning>,
}

/// Remove, or report in check mode, every entry under `root` that the denylist matches
///
/// The tree is walked contents-first so a directory is only decided after all of
/// its descendants. Since matching looks at the whole path, every descendant of a
/// matching directory matches too and is handled before it; the directory itself
/// is then removed along with anything left inside. Every match is appended to
/// the log in both modes; the log records decisions and is never consulted here,
/// so a check run does not keep a later delete run from removing the same paths.
pub fn prune_tree<L>(
    root: &Path,
    denylist: &Denylist,
    mode: PruneMode,
    log: &mut L,
    progress: &dyn ProgressReporter,
) -> Result<PruneReport>
where
    L: ProcessedSet + ?Sized,
{
    let walk = walk_tree(root, WalkOrder::ContentsFirst)?;
    let mut report = PruneReport {
        mode,
        walked: walk.entries.len(),
        candidates: Vec::new(),
        removed: 0,
        warnings: Vec::new(),
    };

    log::info!(
        "Pruning {} ({:?} mode, {} patterns, {} files)",
        root.display(),
        mode,
        denylist.patterns().len(),
        walk.file_count()
    );

    let bar = progress.start("prune", walk.file_count() as u64);

    for entry in &walk.entries {
        if !entry.is_dir {
            bar.inc(1);
        }

        if entry.path == root {
            continue;
        }

        let key = log_key(&entry.path);
        let Some(pattern) = denylist.matching_pattern(&key) else {
            continue;
        };

        match mode {
            PruneMode::Delete => {
                log::info!("delete {} (matched {:?})", entry.path.display(), pattern);
                remove_entry(&entry.path, entry.is_dir)?;
                report.removed += 1;
            }
            PruneMode::Check => {
                log::info!("would delete {} (matched {:?})", entry.path.display(), pattern);
            }
        }

        report.candidates.push(PruneCandidate {
            path: entry.path.clone(),
            is_dir: entry.is_dir,
            pattern: pattern.to_string(),
        });

        log.append(&key)?;
    }

    bar.finish();
    report.warnings = walk.warnings;

    log::info!(
        "Prune finished: {} matches, {} removed",
        report.candidates.len(),
        report.removed
    );

    Ok(report)
}
