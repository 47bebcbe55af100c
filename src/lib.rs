//! mediatidy - organize media file trees by extension
//!
//! This library walks a source tree and rebuilds it under a destination
//! partitioned by file extension (and, in batch mode, by originating
//! top-level subfolder), transferring each file by copy, symbolic link, or
//! hard link. Runs are idempotent: anything already present at a
//! destination path is skipped, so interrupted runs can simply be repeated.
//! An optional, double-confirmed deletion of the source tree closes out a
//! run.

pub mod cancel;
pub mod cli;
pub mod config;
pub mod confirm;
pub mod extension;
pub mod organizer;
pub mod output;
pub mod stats;
pub mod transfer;

pub use cancel::CancelToken;
pub use config::{CompiledFilters, ConfigError, FilterConfig};
pub use confirm::{ConfirmationProvider, DeletionOutcome, StdinConfirmation};
pub use extension::{ExtensionKey, classify};
pub use organizer::{Organizer, RunConfig, TransferObserver};
pub use stats::RunStatistics;
pub use transfer::{OrganizeError, TransferJob, TransferOutcome, TransferStrategy};

pub use cli::{Cli, run_cli};
