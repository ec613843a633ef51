use std::path::{Path, PathBuf};

use crate::error::{MirrorError, Result};

/// Translate a path under `source_root` into the matching path under `target_root`
///
/// The source root must be a component-wise prefix of `source_path`: `/a/b` maps
/// `/a/b/c` but not `/a/bc`. An empty source root never matches.
pub fn make_target_path(source_root: &Path, target_root: &Path, source_path: &Path) -> Result<PathBuf> {
    let not_under_root = || MirrorError::PathMapping {
        root: source_root.to_path_buf(),
        path: source_path.to_path_buf(),
    };

    if source_root.as_os_str().is_empty() {
        return Err(not_under_root());
    }

    let suffix = source_path
        .strip_prefix(source_root)
        .map_err(|_| not_under_root())?;

    if suffix.as_os_str().is_empty() {
        return Ok(target_root.to_path_buf());
    }

    Ok(target_root.join(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_maps_nested_file() {
        let mapped =
            make_target_path(Path::new("/a/b"), Path::new("/x/y"), Path::new("/a/b/c/d.txt")).unwrap();
        assert_eq!(mapped, PathBuf::from("/x/y/c/d.txt"));
    }

    #[test]
    fn test_root_maps_to_target_root() {
        let mapped = make_target_path(Path::new("/a/b"), Path::new("/x/y"), Path::new("/a/b")).unwrap();
        assert_eq!(mapped, PathBuf::from("/x/y"));
    }

    #[test]
    fn test_repeated_root_segment_is_not_ambiguous() {
        let mapped =
            make_target_path(Path::new("/a/b"), Path::new("/x"), Path::new("/a/b/a/b/f")).unwrap();
        assert_eq!(mapped, PathBuf::from("/x/a/b/f"));
    }

    #[rstest]
    #[case("/a/b", "/a/bc/d")]
    #[case("/a/b", "/c/a/b/d")]
    #[case("/a/b", "/other")]
    #[case("", "/a/b/c")]
    fn test_paths_outside_root_are_rejected(#[case] root: &str, #[case] path: &str) {
        let err = make_target_path(Path::new(root), Path::new("/x"), Path::new(path)).unwrap_err();
        assert!(matches!(err, MirrorError::PathMapping { .. }));
    }
}
