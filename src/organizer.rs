//! Traversal planning: the organizing engine's driving loop.
//!
//! The [`Organizer`] walks the source tree in one of two modes and hands one
//! [`TransferJob`] per file to the executor:
//!
//! - **Flat mode** walks the whole source tree; each file lands at
//!   `destination / extension / file_name`.
//! - **Batch mode** treats each immediate child directory of the source root
//!   as one batch folder; files land at
//!   `destination / subfolder / extension / file_name`. Non-directory
//!   entries at the top level are silently ignored.
//!
//! The cancellation token is polled once per file, so cancellation latency
//! is bounded by one file's transfer time. The walk order itself is
//! filesystem-dependent and not contractual.

use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::cancel::CancelToken;
use crate::config::CompiledFilters;
use crate::extension::{classify, is_file_entry, scan_extensions, walk_error};
use crate::output::OutputFormatter;
use crate::stats::RunStatistics;
use crate::transfer::{
    self, OrganizeError, OrganizeResult, TransferJob, TransferOutcome, TransferStrategy,
};

/// Observer notified synchronously after each file outcome.
///
/// Lets embedding callers track progress through the counters rather than
/// by parsing console output.
pub trait TransferObserver {
    fn on_file_completed(&self, job: &TransferJob, outcome: TransferOutcome);
}

/// Immutable options for one run.
///
/// Symlink/hardlink mutual exclusion is a contract of the calling layer;
/// the engine receives a single already-chosen strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunConfig {
    /// Partition the destination per top-level source subfolder.
    pub batch_mode: bool,
    /// How files reach the destination.
    pub strategy: TransferStrategy,
    /// Run the guarded deletion sequence after the summary.
    pub delete_source: bool,
}

/// Drives one organizing run over a source/destination pair.
pub struct Organizer {
    config: RunConfig,
    filters: CompiledFilters,
    cancel: CancelToken,
    observer: Option<Box<dyn TransferObserver>>,
}

impl Organizer {
    pub fn new(config: RunConfig, cancel: CancelToken) -> Self {
        Self {
            config,
            filters: CompiledFilters::allow_all(),
            cancel,
            observer: None,
        }
    }

    /// Replaces the default allow-all filters with compiled exclusion rules.
    pub fn with_filters(mut self, filters: CompiledFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Registers an observer called after every file outcome.
    pub fn with_observer(mut self, observer: Box<dyn TransferObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Runs the full pipeline: scan, traverse, transfer, accumulate.
    ///
    /// Returns the finished statistics on normal completion. Cancellation
    /// and every fatal I/O failure surface as an error; no summary should be
    /// printed for those runs. Re-running against a partially completed
    /// destination is safe: existing entries are skipped, so the destination
    /// tree itself acts as the record of already-finished work.
    pub fn organize(&self, source: &Path, destination: &Path) -> OrganizeResult<RunStatistics> {
        if !source.is_dir() {
            return Err(OrganizeError::SourceNotFound {
                path: source.to_path_buf(),
            });
        }

        fs::create_dir_all(destination).map_err(|e| OrganizeError::DirectoryCreationFailed {
            path: destination.to_path_buf(),
            source: e,
        })?;

        let spinner = OutputFormatter::scan_spinner("Scanning source tree for extensions...");
        let extensions = scan_extensions(source)?;
        spinner.finish_and_clear();

        let labels: Vec<String> = extensions.iter().map(|key| key.label()).collect();
        OutputFormatter::info(&format!(
            "Found {} distinct extension(s): {}",
            extensions.len(),
            labels.join(", ")
        ));

        let mut stats = RunStatistics::new();

        if self.config.batch_mode {
            self.organize_batch(source, destination, &mut stats)?;
        } else {
            self.process_tree(source, destination, &mut stats)?;
        }

        Ok(stats)
    }

    /// Batch mode: one destination subtree per top-level source directory.
    fn organize_batch(
        &self,
        source: &Path,
        destination: &Path,
        stats: &mut RunStatistics,
    ) -> OrganizeResult<()> {
        let entries = fs::read_dir(source).map_err(|e| OrganizeError::EnumerationFailed {
            path: source.to_path_buf(),
            source: e,
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| OrganizeError::EnumerationFailed {
                path: source.to_path_buf(),
                source: e,
            })?;
            let file_type = entry.file_type().map_err(|e| OrganizeError::EnumerationFailed {
                path: entry.path(),
                source: e,
            })?;
            if !file_type.is_dir() {
                // Top-level files are neither batch folders nor transfer
                // candidates in this mode.
                continue;
            }

            let subfolder = entry.path();
            let subfolder_name = entry.file_name();
            OutputFormatter::info(&format!(
                "Processing batch folder: {}",
                subfolder_name.to_string_lossy()
            ));
            stats.record_batch_folder();

            self.process_tree(&subfolder, &destination.join(&subfolder_name), stats)?;

            let depth = subfolder
                .strip_prefix(source)
                .map(|rel| rel.components().count() as u64)
                .unwrap_or(1);
            stats.finish_batch(depth);
        }

        Ok(())
    }

    /// Walks one tree and transfers every file under `dest_base / extension`.
    fn process_tree(
        &self,
        walk_root: &Path,
        dest_base: &Path,
        stats: &mut RunStatistics,
    ) -> OrganizeResult<()> {
        for entry in WalkDir::new(walk_root) {
            let entry = entry.map_err(|e| walk_error(walk_root, e))?;
            if !is_file_entry(&entry) {
                continue;
            }

            if self.cancel.is_cancelled() {
                return Err(OrganizeError::Cancelled);
            }

            if !self.filters.should_include(entry.path()) {
                continue;
            }

            let key = classify(&entry.file_name().to_string_lossy());

            // Joining the empty folder name of extensionless files resolves
            // to dest_base itself; those files land directly in the root.
            let type_folder = dest_base.join(key.folder_name());
            fs::create_dir_all(&type_folder).map_err(|e| {
                OrganizeError::DirectoryCreationFailed {
                    path: type_folder.clone(),
                    source: e,
                }
            })?;

            let job = TransferJob {
                source: entry.path().to_path_buf(),
                destination: type_folder.join(entry.file_name()),
                strategy: self.config.strategy,
            };
            let outcome = transfer::execute(&job)?;
            stats.record(&key, outcome);
            if let Some(observer) = &self.observer {
                observer.on_file_completed(&job, outcome);
            }
        }

        Ok(())
    }
}
