//! Progress reporting abstraction
//!
//! Keeps the workflows free of terminal concerns (indicatif).

use indicatif::{ProgressBar, ProgressStyle};

/// A handle to an active progress display
pub trait ProgressHandle {
    /// Advance by `n` steps
    fn inc(&self, n: u64);
    fn finish(&self);
}

/// Factory for progress handles
pub trait ProgressReporter {
    fn start(&self, label: &str, total: u64) -> Box<dyn ProgressHandle>;
}

/// Indicatif-based progress bar drawn on stderr
pub struct IndicatifProgress {
    color: &'static str,
}

impl IndicatifProgress {
    /// Bar used while mirroring
    pub const SYNC: IndicatifProgress = IndicatifProgress { color: "green" };

    /// Bar used while pruning
    pub const PRUNE: IndicatifProgress = IndicatifProgress { color: "red" };
}

impl ProgressReporter for IndicatifProgress {
    fn start(&self, label: &str, total: u64) -> Box<dyn ProgressHandle> {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(&format!(
                    "{}: [{{bar:35.{}}}] {{pos}}/{{len}} ({{per_sec}})",
                    label, self.color
                ))
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        Box::new(IndicatifHandle(pb))
    }
}

struct IndicatifHandle(ProgressBar);

impl ProgressHandle for IndicatifHandle {
    fn inc(&self, n: u64) {
        self.0.inc(n);
    }

    fn finish(&self) {
        self.0.finish_and_clear();
    }
}

/// No-op progress reporter for quiet mode and tests
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn start(&self, _label: &str, _total: u64) -> Box<dyn ProgressHandle> {
        Box::new(NoopHandle)
    }
}

struct NoopHandle;

impl ProgressHandle for NoopHandle {
    fn inc(&self, _n: u64) {}
    fn finish(&self) {}
}

/// Pick the bar for interactive terminals, or nothing when quiet or piped
pub fn terminal_reporter(bar: IndicatifProgress, quiet: bool) -> Box<dyn ProgressReporter> {
    if quiet || !atty::is(atty::Stream::Stderr) {
        Box::new(NoopProgress)
    } else {
        Box::new(bar)
    }
}
