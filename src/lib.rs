//! # dirmirror
//!
//! Incrementally mirror a directory tree and prune unwanted files, remembering
//! every handled path in a plain append-only log.
//!
//! ## Overview
//!
//! Two workflows share the same primitives:
//!
//! - **Sync** walks a source tree and recreates every directory and file that the
//!   processed-path log does not list yet under a target root, appending each
//!   handled path as it goes. Re-running is cheap and never copies twice.
//! - **Prune** walks a tree and removes (or, in check mode, only reports) every
//!   entry whose full path contains one of the denylist substrings.
//!
//! Every error other than an unreadable entry during the walk stops the run at
//! once. The log then lists exactly the entries completed before the failure.
//!
//! ## Architecture
//!
//! - Directory primitives ([`walker`], [`processed`], [`mapper`], [`transfer`], [`denylist`])
//! - Workflows ([`mirror`]) with injected progress reporting ([`progress`])
//! - Errors ([`error`]), configuration ([`config`]), diagnostics ([`logger`]) and run summaries ([`report`])

/// Platform-agnostic configuration directory management.
///
/// Locates the directory holding the denylist, the latest run report and the
/// diagnostic log (XDG on Linux, Application Support on macOS, AppData on Windows).
pub mod config;

/// Substring denylist used by the prune workflow, and its persisted configuration.
pub mod denylist;

pub mod error;

/// Logging configuration.
///
/// Console logging through `env_logger` (controlled by `RUST_LOG`) plus a
/// rotated diagnostic log file in the config directory.
pub mod logger;

/// Path translation from the source root to the target root.
pub mod mapper;

/// The sync and prune workflows.
pub mod mirror;

/// Append-only processed-path log.
pub mod processed;

pub mod progress;

/// Run summaries: console output, markdown and JSON.
pub mod report;

/// File copy, directory creation and removal.
pub mod transfer;

/// Recursive directory enumeration.
pub mod walker;

pub use denylist::Denylist;
pub use error::{MirrorError, Result};
pub use mirror::{prune_tree, sync_tree, PruneMode, PruneReport, SyncReport};
pub use processed::{PreloadedLog, ProcessedLog, ProcessedSet};
