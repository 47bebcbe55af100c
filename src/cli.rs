//! Command-line surface and orchestration glue.
//!
//! This layer only collects configuration and invokes the engine: it parses
//! arguments, enforces the caller-side contracts (strategy mutual exclusion,
//! blocking deletion combined with link strategies), wires up cancellation,
//! and maps engine errors to process exit behavior.

use clap::Parser;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::thread;

use crate::cancel::CancelToken;
use crate::config::{CompiledFilters, FilterConfig};
use crate::confirm::{self, StdinConfirmation};
use crate::organizer::{Organizer, RunConfig};
use crate::output::OutputFormatter;
use crate::transfer::TransferStrategy;

/// Copy, symlink, or hard link media files into an extension-partitioned
/// destination tree.
#[derive(Parser, Debug)]
#[command(name = "mediatidy", version)]
pub struct Cli {
    /// Path to the source folder.
    pub source_folder: PathBuf,

    /// Path to the destination folder.
    pub destination_folder: PathBuf,

    /// Batch mode: partition the destination per top-level source subfolder.
    #[arg(long)]
    pub batch: bool,

    /// Space-saving mode: create symbolic links instead of copying.
    #[arg(long)]
    pub spacesave: bool,

    /// Space-saving admin mode: create hard links instead of copying.
    #[arg(long, conflicts_with = "spacesave")]
    pub spacesaveadmin: bool,

    /// Delete the source folder when done (double confirmation required).
    #[arg(long)]
    pub delete_source: bool,

    /// Override the source folder.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Override the destination folder.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// TOML file with exclusion filter rules.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// The transfer strategy implied by the space-saving flags.
    pub fn strategy(&self) -> TransferStrategy {
        if self.spacesaveadmin {
            TransferStrategy::Hardlink
        } else if self.spacesave {
            TransferStrategy::Symlink
        } else {
            TransferStrategy::Copy
        }
    }
}

/// Runs one organizing run from parsed arguments.
///
/// Returns `Err` for every outcome that must exit non-zero: contract
/// violations caught here, fatal engine errors, and cancellation.
pub fn run_cli(cli: Cli) -> Result<(), String> {
    let strategy = cli.strategy();

    // Links point back into the source tree; deleting it afterwards would
    // destroy the organized data. Blocked here, before the engine runs.
    if cli.delete_source && strategy != TransferStrategy::Copy {
        return Err(
            "Cannot combine --delete-source with --spacesave or --spacesaveadmin: \
             deleting the source would break every created link."
                .to_string(),
        );
    }

    let source = cli.input.clone().unwrap_or(cli.source_folder);
    let destination = cli.output.clone().unwrap_or(cli.destination_folder);

    let filters = match &cli.config {
        Some(path) => FilterConfig::load(path)
            .map_err(|e| format!("Error loading configuration: {}", e))?
            .compile()
            .map_err(|e| format!("Error compiling filters: {}", e))?,
        None => CompiledFilters::allow_all(),
    };

    let cancel = CancelToken::new();
    // Stdin is reserved for the confirmation prompts when deletion is
    // requested, so the Enter-to-stop watcher only runs otherwise.
    if !cli.delete_source {
        spawn_stop_watcher(cancel.clone());
    }

    let config = RunConfig {
        batch_mode: cli.batch,
        strategy,
        delete_source: cli.delete_source,
    };

    OutputFormatter::info(&format!(
        "Organizing {} into {} ({} mode, {} strategy)",
        source.display(),
        destination.display(),
        if config.batch_mode { "batch" } else { "flat" },
        strategy
    ));

    let organizer = Organizer::new(config, cancel).with_filters(filters);
    let stats = organizer
        .organize(&source, &destination)
        .map_err(|e| e.to_string())?;

    stats.print_summary();

    if config.delete_source {
        let mut provider = StdinConfirmation;
        confirm::delete_source_tree(&source, &mut provider);
    }

    Ok(())
}

/// Waits for the operator to press Enter, then requests cancellation.
///
/// The thread blocks on stdin for the whole run and is dropped with the
/// process; the traversal loop notices the token between files.
fn spawn_stop_watcher(cancel: CancelToken) {
    OutputFormatter::plain("Press Enter to stop the run...");
    thread::spawn(move || {
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_ok() {
            cancel.cancel();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_flags_map_to_strategies() {
        let cli = Cli::try_parse_from(["mediatidy", "src", "dest"]).unwrap();
        assert_eq!(cli.strategy(), TransferStrategy::Copy);

        let cli = Cli::try_parse_from(["mediatidy", "src", "dest", "--spacesave"]).unwrap();
        assert_eq!(cli.strategy(), TransferStrategy::Symlink);

        let cli = Cli::try_parse_from(["mediatidy", "src", "dest", "--spacesaveadmin"]).unwrap();
        assert_eq!(cli.strategy(), TransferStrategy::Hardlink);
    }

    #[test]
    fn test_spacesave_flags_are_mutually_exclusive() {
        let result = Cli::try_parse_from([
            "mediatidy",
            "src",
            "dest",
            "--spacesave",
            "--spacesaveadmin",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_delete_source_with_link_strategy_is_rejected() {
        let cli = Cli::try_parse_from([
            "mediatidy",
            "src",
            "dest",
            "--spacesave",
            "--delete-source",
        ])
        .unwrap();
        let result = run_cli(cli);
        assert!(result.is_err());
    }

    #[test]
    fn test_input_output_overrides() {
        let cli = Cli::try_parse_from([
            "mediatidy",
            "src",
            "dest",
            "--input",
            "real_src",
            "--output",
            "real_dest",
        ])
        .unwrap();
        assert_eq!(cli.input.as_deref(), Some(std::path::Path::new("real_src")));
        assert_eq!(
            cli.output.as_deref(),
            Some(std::path::Path::new("real_dest"))
        );
    }
}
