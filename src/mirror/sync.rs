use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::mapper::make_target_path;
use crate::processed::ProcessedSet;
use crate::progress::ProgressReporter;
use crate::transfer::{copy_file, make_dir};
use crate::walker::{walk_tree, Entry, WalkOrder, WalkWarning};

use super::log_key;

/// Outcome of a mirror run
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    /// Entries produced by the walk, root included
    pub walked: usize,
    pub files_copied: usize,
    pub dirs_created: usize,
    pub bytes_copied: u64,

    /// Entries skipped because the log already lists them
    pub skipped_logged: usize,

    pub warnings: Vec<WalkWarning>,
}

/// Mirror every entry under `source_root` that the log does not list yet into `target_root`
///
/// Directories are recreated, files are copied byte for byte, and each handled
/// source path is appended to the log right after its copy. The log is the only
/// record consulted: a logged file deleted from the target is not copied again.
///
/// A symlink to a regular file is copied as a regular file. Symlinks to
/// directories and dangling symlinks are skipped with a warning and not logged.
pub fn sync_tree<L>(
    source_root: &Path,
    target_root: &Path,
    log: &mut L,
    progress: &dyn ProgressReporter,
) -> Result<SyncReport>
where
    L: ProcessedSet + ?Sized,
{
    let mut walk = walk_tree(source_root, WalkOrder::RootFirst)?;
    let mut report = SyncReport {
        walked: walk.entries.len(),
        warnings: std::mem::take(&mut walk.warnings),
        ..Default::default()
    };

    log::info!(
        "Mirroring {} -> {} ({} files)",
        source_root.display(),
        target_root.display(),
        walk.file_count()
    );

    make_dir(target_root)?;

    let bar = progress.start("sync", walk.file_count() as u64);

    for entry in &walk.entries {
        if !entry.is_dir {
            bar.inc(1);
        }

        if entry.path == source_root {
            continue;
        }

        let key = log_key(&entry.path);
        if log.contains(&key)? {
            log::trace!("Already handled: {key}");
            report.skipped_logged += 1;
            continue;
        }

        if entry.is_symlink {
            if let Some(warning) = uncopyable_link(entry) {
                log::warn!("Skipping {}: {}", entry.path.display(), warning.message);
                report.warnings.push(warning);
                continue;
            }
        }

        let target_path = make_target_path(source_root, target_root, &entry.path)?;

        if entry.is_dir {
            make_dir(&target_path)?;
            report.dirs_created += 1;
        } else {
            report.bytes_copied += copy_file(&entry.path, &target_path)?;
            report.files_copied += 1;
        }

        log.append(&key)?;
    }

    bar.finish();

    log::info!(
        "Mirror finished: {} files copied, {} directories created, {} already handled",
        report.files_copied,
        report.dirs_created,
        report.skipped_logged
    );

    Ok(report)
}

/// Warning for a symlink whose target is not a regular file
fn uncopyable_link(entry: &Entry) -> Option<WalkWarning> {
    let message = match fs::metadata(&entry.path) {
        Ok(metadata) if metadata.is_file() => return None,
        Ok(_) => "symlink does not point to a regular file".to_string(),
        Err(err) => format!("dangling symlink: {err}"),
    };

    Some(WalkWarning {
        path: Some(entry.path.clone()),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MirrorError;
    use crate::processed::{PreloadedLog, ProcessedLog};
    use crate::progress::{NoopProgress, ProgressHandle};
    use std::cell::Cell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    struct CountingProgress {
        total: Rc<Cell<u64>>,
        advanced: Rc<Cell<u64>>,
    }

    struct CountingHandle(Rc<Cell<u64>>);

    impl ProgressHandle for CountingHandle {
        fn inc(&self, n: u64) {
            self.0.set(self.0.get() + n);
        }
        fn finish(&self) {}
    }

    impl ProgressReporter for CountingProgress {
        fn start(&self, _label: &str, total: u64) -> Box<dyn ProgressHandle> {
            self.total.set(total);
            Box::new(CountingHandle(self.advanced.clone()))
        }
    }

    fn source_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("docs/deep")).unwrap();
        fs::create_dir_all(temp.path().join("empty")).unwrap();
        fs::write(temp.path().join("root.bin"), b"root").unwrap();
        fs::write(temp.path().join("docs/a.md"), b"alpha").unwrap();
        fs::write(temp.path().join("docs/deep/b.md"), b"beta").unwrap();
        temp
    }

    #[test]
    fn test_sync_copies_tree() {
        let source = source_tree();
        let target = TempDir::new().unwrap();
        let state = TempDir::new().unwrap();
        let mut log = ProcessedLog::new(state.path().join("log"));

        let report = sync_tree(source.path(), target.path(), &mut log, &NoopProgress).unwrap();

        assert_eq!(report.files_copied, 3);
        assert_eq!(report.dirs_created, 3);
        assert_eq!(report.bytes_copied, 13);
        assert_eq!(report.skipped_logged, 0);
        assert_eq!(fs::read(target.path().join("docs/deep/b.md")).unwrap(), b"beta");
        assert!(target.path().join("empty").is_dir());
    }

    #[test]
    fn test_root_is_never_logged() {
        let source = source_tree();
        let target = TempDir::new().unwrap();
        let state = TempDir::new().unwrap();
        let mut log = ProcessedLog::new(state.path().join("log"));

        sync_tree(source.path(), target.path(), &mut log, &NoopProgress).unwrap();

        let lines = log.read_all().unwrap();
        assert_eq!(lines.len(), 6);
        assert!(!lines.contains(&source.path().to_string_lossy().to_string()));
    }

    #[test]
    fn test_second_run_skips_everything() {
        let source = source_tree();
        let target = TempDir::new().unwrap();
        let state = TempDir::new().unwrap();
        let mut log = ProcessedLog::new(state.path().join("log"));

        sync_tree(source.path(), target.path(), &mut log, &NoopProgress).unwrap();
        let second = sync_tree(source.path(), target.path(), &mut log, &NoopProgress).unwrap();

        assert_eq!(second.files_copied, 0);
        assert_eq!(second.dirs_created, 0);
        assert_eq!(second.skipped_logged, 6);
    }

    #[test]
    fn test_logged_file_deleted_from_target_is_not_recopied() {
        let source = source_tree();
        let target = TempDir::new().unwrap();
        let state = TempDir::new().unwrap();
        let mut log = ProcessedLog::new(state.path().join("log"));

        sync_tree(source.path(), target.path(), &mut log, &NoopProgress).unwrap();
        fs::remove_file(target.path().join("docs/a.md")).unwrap();
        sync_tree(source.path(), target.path(), &mut log, &NoopProgress).unwrap();

        assert!(!target.path().join("docs/a.md").exists());
    }

    #[test]
    fn test_new_source_files_are_picked_up() {
        let source = source_tree();
        let target = TempDir::new().unwrap();
        let state = TempDir::new().unwrap();
        let mut log = PreloadedLog::load(state.path().join("log")).unwrap();

        sync_tree(source.path(), target.path(), &mut log, &NoopProgress).unwrap();
        fs::write(source.path().join("docs/new.md"), b"fresh").unwrap();
        let report = sync_tree(source.path(), target.path(), &mut log, &NoopProgress).unwrap();

        assert_eq!(report.files_copied, 1);
        assert_eq!(fs::read(target.path().join("docs/new.md")).unwrap(), b"fresh");
    }

    #[test]
    fn test_progress_advances_per_file() {
        let source = source_tree();
        let target = TempDir::new().unwrap();
        let state = TempDir::new().unwrap();
        let mut log = ProcessedLog::new(state.path().join("log"));
        let progress = CountingProgress {
            total: Rc::new(Cell::new(0)),
            advanced: Rc::new(Cell::new(0)),
        };

        sync_tree(source.path(), target.path(), &mut log, &progress).unwrap();

        assert_eq!(progress.total.get(), 3);
        assert_eq!(progress.advanced.get(), 3);
    }

    #[test]
    fn test_missing_source_is_walk_error() {
        let state = TempDir::new().unwrap();
        let mut log = ProcessedLog::new(state.path().join("log"));

        let err = sync_tree(
            &state.path().join("missing"),
            &state.path().join("target"),
            &mut log,
            &NoopProgress,
        )
        .unwrap_err();

        assert!(matches!(err, MirrorError::Walk { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_to_directories_and_dangling_links_are_skipped() {
        use std::os::unix::fs::symlink;

        let source = source_tree();
        let target = TempDir::new().unwrap();
        let state = TempDir::new().unwrap();
        let mut log = ProcessedLog::new(state.path().join("log"));
        symlink(source.path().join("docs"), source.path().join("docs-link")).unwrap();
        symlink(source.path().join("gone.md"), source.path().join("dangling")).unwrap();
        symlink(source.path().join("root.bin"), source.path().join("root-link")).unwrap();

        let report = sync_tree(source.path(), target.path(), &mut log, &NoopProgress).unwrap();

        assert_eq!(report.files_copied, 4);
        let copied = target.path().join("root-link");
        assert!(!fs::symlink_metadata(&copied).unwrap().file_type().is_symlink());
        assert_eq!(fs::read(&copied).unwrap(), b"root");

        assert!(fs::symlink_metadata(target.path().join("docs-link")).is_err());
        assert!(fs::symlink_metadata(target.path().join("dangling")).is_err());
        for name in ["docs-link", "dangling"] {
            let path = source.path().join(name);
            assert!(report.warnings.iter().any(|w| w.path.as_deref() == Some(path.as_path())));
        }

        let lines = log.read_all().unwrap();
        assert!(!lines.iter().any(|l| l.ends_with("docs-link") || l.ends_with("dangling")));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_does_not_stop_the_run() {
        use std::os::unix::fs::PermissionsExt;

        let source = source_tree();
        let target = TempDir::new().unwrap();
        let state = TempDir::new().unwrap();
        let mut log = ProcessedLog::new(state.path().join("log"));
        let locked = source.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("secret.md"), b"s").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Permission bits do not apply to root
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = sync_tree(source.path(), target.path(), &mut log, &NoopProgress);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let report = result.unwrap();
        assert!(report
            .warnings
            .iter()
            .any(|w| w.path.as_deref() == Some(locked.as_path())));
        assert_eq!(report.files_copied, 3);
        assert_eq!(fs::read(target.path().join("docs/deep/b.md")).unwrap(), b"beta");
        assert!(!target.path().join("locked/secret.md").exists());
    }
}
