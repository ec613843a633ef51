use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};

use dirmirror::denylist::{self, DenylistConfig};
use dirmirror::logger;
use dirmirror::processed::{PreloadedLog, ProcessedLog, ProcessedSet};
use dirmirror::progress::{terminal_reporter, IndicatifProgress};
use dirmirror::report::{self, RunReport};
use dirmirror::{prune_tree, sync_tree, PruneMode};

#[derive(Parser)]
#[command(name = "dirmirror")]
#[command(about = "Incrementally mirror a directory tree and prune unwanted files", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy every entry of SOURCE not yet listed in the log into TARGET
    Sync {
        /// Directory to mirror
        #[arg(short, long)]
        source: PathBuf,

        /// Directory receiving the mirror
        #[arg(short, long)]
        target: PathBuf,

        /// Processed-path log
        #[arg(short, long, default_value = "./log")]
        log: PathBuf,

        /// Load the log into memory once instead of re-reading it per entry
        #[arg(long)]
        preload_log: bool,

        /// Hide the progress bar and summary
        #[arg(short, long)]
        quiet: bool,
    },

    /// Remove entries of SOURCE whose path contains a denylisted substring
    Prune {
        /// Directory to clean
        #[arg(short, long)]
        source: PathBuf,

        /// Processed-path log; every match is appended in both modes
        #[arg(short, long, default_value = "./log")]
        log: PathBuf,

        /// Only report matches; pass `--check false` to delete them
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        check: bool,

        /// TOML file with a `patterns` list, instead of the configured denylist
        #[arg(long)]
        denylist: Option<PathBuf>,

        /// Load the log into memory once instead of re-reading it per entry
        #[arg(long)]
        preload_log: bool,

        /// Hide the progress bar and summary
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show or edit the persisted denylist
    Config {
        /// Show the current denylist
        #[arg(long)]
        show: bool,

        /// Add a pattern (repeatable)
        #[arg(long)]
        add: Vec<String>,

        /// Remove a pattern (repeatable)
        #[arg(long)]
        remove: Vec<String>,

        /// Restore the built-in denylist before applying other changes
        #[arg(long)]
        reset: bool,
    },

    /// Show the report of the latest run
    Report {
        /// Output format: json or markdown
        #[arg(short, long, default_value = "markdown")]
        format: String,

        /// Output file (default: print to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logger::init_logger()?;

    match cli.command {
        Commands::Sync {
            source,
            target,
            log,
            preload_log,
            quiet,
        } => run_sync(&source, &target, &log, preload_log, quiet)?,
        Commands::Prune {
            source,
            log,
            check,
            denylist,
            preload_log,
            quiet,
        } => run_prune(
            &source,
            &log,
            PruneMode::from_check_flag(check),
            denylist.as_deref(),
            preload_log,
            quiet,
        )?,
        Commands::Config {
            show,
            add,
            remove,
            reset,
        } => {
            if show || (add.is_empty() && remove.is_empty() && !reset) {
                denylist::show_config()?;
            } else {
                denylist::update_config(add, remove, reset)?;
            }
        }
        Commands::Report { format, output } => {
            report::generate_report(&format, output.as_deref())?;
        }
    }

    Ok(())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("Invalid path: {}", path.display()))
}

fn open_log(path: &Path, preload: bool) -> Result<Box<dyn ProcessedSet>> {
    if preload {
        Ok(Box::new(PreloadedLog::load(path)?))
    } else {
        Ok(Box::new(ProcessedLog::new(path)))
    }
}

fn run_sync(source: &Path, target: &Path, log_path: &Path, preload: bool, quiet: bool) -> Result<()> {
    let source = absolute(source)?;
    let target = absolute(target)?;
    logger::log_to_file(&format!(
        "sync {} -> {} (log {})",
        source.display(),
        target.display(),
        log_path.display()
    ))?;

    let mut log = open_log(log_path, preload)?;
    let progress = terminal_reporter(IndicatifProgress::SYNC, quiet);

    let outcome = sync_tree(&source, &target, log.as_mut(), progress.as_ref());
    let sync = match outcome {
        Ok(sync) => sync,
        Err(e) => {
            logger::log_to_file(&format!("sync failed ({}): {e}", e.kind()))?;
            return Err(e).context("Sync aborted");
        }
    };

    logger::log_to_file(&format!(
        "sync finished: {} files, {} directories, {} skipped",
        sync.files_copied, sync.dirs_created, sync.skipped_logged
    ))?;

    let run = RunReport::for_sync(&source, &target, log_path, sync);
    if !quiet {
        run.print_summary();
    }
    if let Err(e) = run.save() {
        log::warn!("Failed to save run report: {e:#}");
    }

    Ok(())
}

fn run_prune(
    source: &Path,
    log_path: &Path,
    mode: PruneMode,
    denylist_file: Option<&Path>,
    preload: bool,
    quiet: bool,
) -> Result<()> {
    let source = absolute(source)?;
    let config = match denylist_file {
        Some(path) => DenylistConfig::load_from(path)?,
        None => DenylistConfig::load()?,
    };
    let denylist = config.matcher();

    logger::log_to_file(&format!(
        "prune {} ({:?}, log {})",
        source.display(),
        mode,
        log_path.display()
    ))?;

    let mut log = open_log(log_path, preload)?;
    let progress = terminal_reporter(IndicatifProgress::PRUNE, quiet);

    let outcome = prune_tree(&source, &denylist, mode, log.as_mut(), progress.as_ref());
    let prune = match outcome {
        Ok(prune) => prune,
        Err(e) => {
            logger::log_to_file(&format!("prune failed ({}): {e}", e.kind()))?;
            return Err(e).context("Prune aborted");
        }
    };

    logger::log_to_file(&format!(
        "prune finished: {} matches, {} removed",
        prune.candidates.len(),
        prune.removed
    ))?;

    let run = RunReport::for_prune(&source, log_path, prune);
    if !quiet {
        run.print_summary();
    }
    if let Err(e) = run.save() {
        log::warn!("Failed to save run report: {e:#}");
    }

    Ok(())
}
