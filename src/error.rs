use std::path::PathBuf;

/// Result type for mirror and prune operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Errors raised by the directory primitives
///
/// Every variant is fatal for a run: the workflows stop on the first one and
/// leave the processed-path log exactly as it was after the last successful
/// append. Unreadable entries below a walk root are warnings, not errors.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    /// The walk root is missing or the traversal itself failed
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A walked path is not located under the source root
    #[error("Path {path} is not under source root {root}")]
    PathMapping { root: PathBuf, path: PathBuf },

    #[error("Failed to copy {src} to {dst}: {source}")]
    Copy {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    DirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Open, read or write failure on the processed-path log
    #[error("Processed-path log I/O error at {path}: {source}")]
    LogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MirrorError {
    pub fn log_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LogIo {
            path: path.into(),
            source,
        }
    }

    /// Short machine-friendly name of the error kind, used in run reports
    pub fn kind(&self) -> &'static str {
        match self {
            MirrorError::Walk { .. } => "walk",
            MirrorError::PathMapping { .. } => "path-mapping",
            MirrorError::Copy { .. } => "copy",
            MirrorError::DirCreate { .. } => "dir-create",
            MirrorError::LogIo { .. } => "log-io",
            MirrorError::Remove { .. } => "remove",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_messages_include_paths() {
        let err = MirrorError::PathMapping {
            root: PathBuf::from("/a/b"),
            path: PathBuf::from("/c/d"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/a/b"));
        assert!(msg.contains("/c/d"));
        assert_eq!(err.kind(), "path-mapping");
    }

    #[test]
    fn test_log_io_keeps_source() {
        use std::error::Error;

        let err = MirrorError::log_io("/tmp/log", io::Error::other("disk full"));
        assert_eq!(err.kind(), "log-io");
        assert!(err.source().is_some());
        assert!(err.to_string().contains("disk full"));
    }
}
