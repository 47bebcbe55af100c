//! Run statistics accumulation and the summary report.
//!
//! One [`RunStatistics`] is created per run, owned exclusively by the run,
//! and printed once at the end. Per-extension counts keep first-insertion
//! order, matching the order extensions were encountered during traversal.

use chrono::{DateTime, Local};
use colored::*;

use crate::extension::ExtensionKey;
use crate::output::OutputFormatter;
use crate::transfer::TransferOutcome;

/// Mutable accumulator for one run.
#[derive(Debug)]
pub struct RunStatistics {
    /// Every file the traversal looked at, whether transferred or skipped.
    pub total_seen: u64,
    /// Files actually created at the destination.
    pub processed: u64,
    /// Files passed over because the destination was already occupied.
    pub skipped: u64,
    /// Top-level batch folders encountered (batch mode only).
    pub folders_processed: u64,
    /// Greatest observed depth of a batch folder relative to the source root.
    pub max_subfolder_depth: u64,
    /// Batch folders fully completed.
    pub jobs_done: u64,
    extension_counts: Vec<(ExtensionKey, u64)>,
    started_at: DateTime<Local>,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self {
            total_seen: 0,
            processed: 0,
            skipped: 0,
            folders_processed: 0,
            max_subfolder_depth: 0,
            jobs_done: 0,
            extension_counts: Vec::new(),
            started_at: Local::now(),
        }
    }

    /// Records one file outcome under its extension key.
    pub fn record(&mut self, key: &ExtensionKey, outcome: TransferOutcome) {
        self.total_seen += 1;
        match outcome {
            TransferOutcome::Created => self.processed += 1,
            TransferOutcome::Skipped => self.skipped += 1,
        }

        if let Some((_, count)) = self
            .extension_counts
            .iter_mut()
            .find(|(existing, _)| existing == key)
        {
            *count += 1;
        } else {
            self.extension_counts.push((key.clone(), 1));
        }
    }

    /// Notes a top-level batch folder before it is walked.
    pub fn record_batch_folder(&mut self) {
        self.folders_processed += 1;
    }

    /// Closes out one batch folder, folding its depth into the maximum.
    pub fn finish_batch(&mut self, depth: u64) {
        self.max_subfolder_depth = self.max_subfolder_depth.max(depth);
        self.jobs_done += 1;
    }

    /// Per-extension counts in first-insertion order.
    pub fn extension_counts(&self) -> &[(ExtensionKey, u64)] {
        &self.extension_counts
    }

    /// Count recorded for one extension key (0 if never seen).
    pub fn count_for(&self, key: &ExtensionKey) -> u64 {
        self.extension_counts
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    /// Share of the total files seen, guarding the empty run.
    fn percentage_of_total(&self, count: u64) -> f64 {
        if self.total_seen == 0 {
            0.0
        } else {
            (count as f64 / self.total_seen as f64) * 100.0
        }
    }

    /// Prints the aggregate summary. Only called after a run that was
    /// neither cancelled nor aborted.
    pub fn print_summary(&self) {
        OutputFormatter::header("Summary Report");
        OutputFormatter::plain(&format!(
            "Run started: {}",
            self.started_at.format("%Y-%m-%d %H:%M:%S")
        ));
        OutputFormatter::plain(&format!("Total files seen: {}", self.total_seen));
        OutputFormatter::plain(&format!("Files processed: {}", self.processed));
        OutputFormatter::plain(&format!(
            "Files skipped: {} ({:.2}%)",
            self.skipped,
            self.percentage_of_total(self.skipped)
        ));

        OutputFormatter::plain("File types:");
        for (key, count) in &self.extension_counts {
            let file_word = if *count == 1 { "file" } else { "files" };
            println!(
                "  {}: {} {} ({:.2}%)",
                key.label(),
                count.to_string().green(),
                file_word,
                self.percentage_of_total(*count)
            );
        }

        OutputFormatter::plain(&format!(
            "Total folders processed: {}",
            self.folders_processed
        ));
        OutputFormatter::plain(&format!(
            "Maximum subfolder depth: {}",
            self.max_subfolder_depth
        ));
        OutputFormatter::plain(&format!("Jobs done: {}", self.jobs_done));
    }
}

impl Default for RunStatistics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::classify;

    #[test]
    fn test_record_splits_created_and_skipped() {
        let mut stats = RunStatistics::new();
        stats.record(&classify("a.jpg"), TransferOutcome::Created);
        stats.record(&classify("b.jpg"), TransferOutcome::Skipped);
        stats.record(&classify("c.mp4"), TransferOutcome::Created);

        assert_eq!(stats.total_seen, 3);
        assert_eq!(stats.processed, 2);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.count_for(&classify("x.jpg")), 2);
        assert_eq!(stats.count_for(&classify("x.mp4")), 1);
    }

    #[test]
    fn test_extension_counts_keep_insertion_order() {
        let mut stats = RunStatistics::new();
        stats.record(&classify("z.mp4"), TransferOutcome::Created);
        stats.record(&classify("a.jpg"), TransferOutcome::Created);
        stats.record(&classify("b.mp4"), TransferOutcome::Created);

        let order: Vec<_> = stats
            .extension_counts()
            .iter()
            .map(|(key, _)| key.label())
            .collect();
        assert_eq!(order, vec![".mp4", ".jpg"]);
    }

    #[test]
    fn test_percentages_guard_empty_run() {
        let stats = RunStatistics::new();
        assert_eq!(stats.percentage_of_total(0), 0.0);
    }

    #[test]
    fn test_batch_counters() {
        let mut stats = RunStatistics::new();
        stats.record_batch_folder();
        stats.record_batch_folder();
        stats.finish_batch(1);
        stats.finish_batch(1);

        assert_eq!(stats.folders_processed, 2);
        assert_eq!(stats.jobs_done, 2);
        assert_eq!(stats.max_subfolder_depth, 1);
    }
}
