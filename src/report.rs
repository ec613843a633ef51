use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::mirror::{PruneMode, PruneReport, SyncReport};

/// Maximum number of prune candidates listed on the console
const MAX_CANDIDATES_TO_DISPLAY: usize = 20;

/// Summary of the most recent run, saved as JSON in the config directory
#[derive(Debug, Serialize, Deserialize)]
pub struct RunReport {
    /// RFC 3339 time the run finished
    pub timestamp: String,

    /// Tree the run walked
    pub source: PathBuf,

    /// Processed-path log the run consulted
    pub log_path: PathBuf,

    pub outcome: RunOutcome,
}

/// Workflow-specific part of a [`RunReport`]
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "workflow", rename_all = "lowercase")]
pub enum RunOutcome {
    Sync { target: PathBuf, report: SyncReport },
    Prune { report: PruneReport },
}

impl RunReport {
    pub fn for_sync(source: &Path, target: &Path, log_path: &Path, report: SyncReport) -> Self {
        RunReport {
            timestamp: chrono::Utc::now().to_rfc3339(),
            source: source.to_path_buf(),
            log_path: log_path.to_path_buf(),
            outcome: RunOutcome::Sync {
                target: target.to_path_buf(),
                report,
            },
        }
    }

    pub fn for_prune(source: &Path, log_path: &Path, report: PruneReport) -> Self {
        RunReport {
            timestamp: chrono::Utc::now().to_rfc3339(),
            source: source.to_path_buf(),
            log_path: log_path.to_path_buf(),
            outcome: RunOutcome::Prune { report },
        }
    }

    /// Save as the latest run report
    pub fn save(&self) -> Result<()> {
        let path = crate::config::ConfigManager::run_report_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize run report")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write run report: {}", path.display()))?;

        Ok(())
    }

    /// Load the latest run report
    pub fn load() -> Result<Self> {
        let path = crate::config::ConfigManager::run_report_path()?;

        if !path.exists() {
            return Err(anyhow!("No run recorded yet. Run 'dirmirror sync' or 'dirmirror prune' first."));
        }

        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read run report: {}", path.display()))?;
        serde_json::from_str(&content).context("Failed to parse run report")
    }

    /// Render as markdown
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str("# dirmirror Run Report\n\n");
        md.push_str(&format!("**Finished:** {}\n\n", self.timestamp));
        md.push_str(&format!("**Source:** `{}`\n\n", self.source.display()));
        md.push_str(&format!("**Log:** `{}`\n\n", self.log_path.display()));

        match &self.outcome {
            RunOutcome::Sync { target, report } => {
                md.push_str("## Sync\n\n");
                md.push_str(&format!("- **Target:** `{}`\n", target.display()));
                md.push_str(&format!("- **Entries walked:** {}\n", report.walked));
                md.push_str(&format!("- **Files copied:** {}\n", report.files_copied));
                md.push_str(&format!("- **Directories created:** {}\n", report.dirs_created));
                md.push_str(&format!("- **Bytes copied:** {}\n", report.bytes_copied));
                md.push_str(&format!("- **Already handled:** {}\n", report.skipped_logged));
                push_warnings(&mut md, report.warnings.len());
            }
            RunOutcome::Prune { report } => {
                md.push_str("## Prune\n\n");
                md.push_str(&format!("- **Mode:** {}\n", mode_label(report.mode)));
                md.push_str(&format!("- **Entries walked:** {}\n", report.walked));
                md.push_str(&format!("- **Matches:** {}\n", report.candidates.len()));
                md.push_str(&format!("- **Removed:** {}\n", report.removed));
                push_warnings(&mut md, report.warnings.len());

                if !report.candidates.is_empty() {
                    md.push_str("\n### Matches\n\n");
                    md.push_str("| Path | Pattern |\n|---|---|\n");
                    for candidate in &report.candidates {
                        md.push_str(&format!(
                            "| `{}` | `{}` |\n",
                            candidate.path.display(),
                            candidate.pattern
                        ));
                    }
                }
            }
        }

        md
    }

    /// Print a short colored summary to the console
    pub fn print_summary(&self) {
        match &self.outcome {
            RunOutcome::Sync { target, report } => {
                println!("{}", "Sync complete".green().bold());
                println!("  {} {}", "Target:".cyan(), target.display());
                println!(
                    "  {} {} files ({} bytes), {} directories",
                    "Copied:".cyan(),
                    report.files_copied,
                    report.bytes_copied,
                    report.dirs_created
                );
                println!("  {} {}", "Already handled:".cyan(), report.skipped_logged);
                print_warning_count(report.warnings.len());
            }
            RunOutcome::Prune { report } => {
                let header = match report.mode {
                    PruneMode::Check => "Prune check complete (nothing removed)".yellow().bold(),
                    PruneMode::Delete => "Prune complete".green().bold(),
                };
                println!("{header}");

                for candidate in report.candidates.iter().take(MAX_CANDIDATES_TO_DISPLAY) {
                    let verb = match report.mode {
                        PruneMode::Check => "would delete".yellow(),
                        PruneMode::Delete => "deleted".red(),
                    };
                    println!("  {} {}", verb, candidate.path.display());
                }
                if report.candidates.len() > MAX_CANDIDATES_TO_DISPLAY {
                    println!(
                        "  {}",
                        format!(
                            "... and {} more",
                            report.candidates.len() - MAX_CANDIDATES_TO_DISPLAY
                        )
                        .dimmed()
                    );
                }

                println!("  {} {}", "Matches:".cyan(), report.candidates.len());
                println!("  {} {}", "Removed:".cyan(), report.removed);
                print_warning_count(report.warnings.len());
            }
        }
    }
}

fn mode_label(mode: PruneMode) -> &'static str {
    match mode {
        PruneMode::Check => "check (dry run)",
        PruneMode::Delete => "delete",
    }
}

fn push_warnings(md: &mut String, count: usize) {
    if count > 0 {
        md.push_str(&format!("- **Entries skipped with warnings:** {count}\n"));
    }
}

fn print_warning_count(count: usize) {
    if count > 0 {
        println!(
            "  {} {} entries were skipped with warnings (see log output)",
            "⚠".yellow().bold(),
            count
        );
    }
}

/// Print or write the latest run report
pub fn generate_report(format: &str, output: Option<&Path>) -> Result<()> {
    let report = RunReport::load()?;

    let content = match format {
        "json" => serde_json::to_string_pretty(&report)?,
        "markdown" | "md" => report.to_markdown(),
        other => return Err(anyhow!("Unknown report format '{other}'. Use 'json' or 'markdown'.")),
    };

    if let Some(path) = output {
        fs::write(path, &content)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("{} {}", "Report written to".green(), path.display());
    } else {
        println!("{content}");
    }

    Ok(())
}
