//! The two workflows built on the directory primitives.
//!
//! Both walk a tree once, consult the processed-path log for every entry and
//! append each entry they act on. Any error stops the run immediately; the log
//! then reflects exactly the entries finished before the failure.

mod prune;
mod sync;

pub use prune::{prune_tree, PruneCandidate, PruneMode, PruneReport};
pub use sync::{sync_tree, SyncReport};

use std::borrow::Cow;
use std::path::Path;

/// String form of a path as written to the processed-path log
pub(crate) fn log_key(path: &Path) -> Cow<'_, str> {
    path.to_string_lossy()
}
