use std::fs::{self, File};
use std::io;
use std::path::Path;

use crate::error::{MirrorError, Result};

/// Copy the bytes of `src` into `dst`, creating or truncating `dst`
///
/// Returns the number of bytes written. The parent of `dst` must already exist.
pub fn copy_file(src: &Path, dst: &Path) -> Result<u64> {
    let copy_err = |source| MirrorError::Copy {
        src: src.to_path_buf(),
        dst: dst.to_path_buf(),
        source,
    };

    let mut reader = File::open(src).map_err(copy_err)?;
    let mut writer = File::create(dst).map_err(copy_err)?;
    let written = io::copy(&mut reader, &mut writer).map_err(copy_err)?;

    log::debug!("Copied {} -> {} ({} bytes)", src.display(), dst.display(), written);
    Ok(written)
}

/// Create `path` and any missing ancestors. Existing directories are fine.
pub fn make_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| MirrorError::DirCreate {
        path: path.to_path_buf(),
        source,
    })
}

/// Remove a file, or a directory together with whatever it still contains
pub fn remove_entry(path: &Path, is_dir: bool) -> Result<()> {
    let result = if is_dir {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    result.map_err(|source| MirrorError::Remove {
        path: path.to_path_buf(),
        source,
    })
}
