/// Transfer execution for a single file.
///
/// A [`TransferJob`] is built per file at traversal time and consumed here
/// immediately. The executor assumes the destination's parent directory has
/// already been created by the planner; it only decides between skipping and
/// performing the configured strategy.
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::output::OutputFormatter;

/// How a file gets from source to destination.
///
/// Symlink and hardlink are mutually exclusive per run; the calling layer
/// enforces that before the engine is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferStrategy {
    /// Duplicate contents and metadata (default).
    #[default]
    Copy,
    /// Create a symbolic link pointing at the source.
    Symlink,
    /// Create a hard link to the source. Same-volume only; failure is fatal.
    Hardlink,
}

impl std::fmt::Display for TransferStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferStrategy::Copy => write!(f, "copy"),
            TransferStrategy::Symlink => write!(f, "symlink"),
            TransferStrategy::Hardlink => write!(f, "hardlink"),
        }
    }
}

/// One file to transfer: source path, resolved destination path, strategy.
#[derive(Debug, Clone)]
pub struct TransferJob {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub strategy: TransferStrategy,
}

/// What the executor did with a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The destination entry was created.
    Created,
    /// Something already occupied the destination path; nothing was mutated.
    Skipped,
}

/// Fatal errors that terminate a run.
///
/// Pre-existing destinations are not errors (they become skips). Everything
/// here aborts the run with no retry and no downgrade between strategies.
#[derive(Debug)]
pub enum OrganizeError {
    /// The source root does not exist or is not a directory.
    SourceNotFound { path: PathBuf },
    /// A directory could not be read during scanning or traversal.
    EnumerationFailed { path: PathBuf, source: io::Error },
    /// A destination directory could not be created.
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// Copying contents or metadata failed.
    CopyFailed {
        source_path: PathBuf,
        destination: PathBuf,
        source: io::Error,
    },
    /// Symbolic link creation failed (e.g. missing privilege).
    SymlinkFailed {
        source_path: PathBuf,
        destination: PathBuf,
        source: io::Error,
    },
    /// Hard link creation failed (cross-device, unsupported file type, ...).
    HardLinkFailed {
        source_path: PathBuf,
        destination: PathBuf,
        source: io::Error,
    },
    /// The cancellation token was observed between files.
    Cancelled,
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SourceNotFound { path } => {
                write!(f, "Source folder not found: {}", path.display())
            }
            Self::EnumerationFailed { path, source } => {
                write!(f, "Failed to read directory {}: {}", path.display(), source)
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::CopyFailed {
                source_path,
                destination,
                source,
            } => {
                write!(
                    f,
                    "Failed to copy {} to {}: {}",
                    source_path.display(),
                    destination.display(),
                    source
                )
            }
            Self::SymlinkFailed {
                source_path,
                destination,
                source,
            } => {
                write!(
                    f,
                    "Failed to create symlink {} for {}: {}",
                    destination.display(),
                    source_path.display(),
                    source
                )
            }
            Self::HardLinkFailed {
                source_path,
                destination,
                source,
            } => {
                write!(
                    f,
                    "Failed to create hard link {} for {}: {}",
                    destination.display(),
                    source_path.display(),
                    source
                )
            }
            Self::Cancelled => write!(f, "run cancelled"),
        }
    }
}

impl std::error::Error for OrganizeError {}

/// Result type for engine operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Executes one transfer job, announcing the outcome on the console.
///
/// Behavior, in order:
/// 1. Anything already at the destination path means skip, no mutation.
/// 2. For the link strategies there is a second, narrower guard: a symlink
///    at the destination also means skip. A broken symlink fails the
///    generic existence check (which follows links) but is still caught
///    here, so the two guards are not collapsible into one.
/// 3. Otherwise the strategy runs; any I/O failure is fatal to the run.
pub fn execute(job: &TransferJob) -> OrganizeResult<TransferOutcome> {
    if job.destination.exists() {
        OutputFormatter::warning(&format!(
            "Skipped: already exists at {}",
            job.destination.display()
        ));
        return Ok(TransferOutcome::Skipped);
    }

    match job.strategy {
        TransferStrategy::Hardlink => {
            if is_symlink(&job.destination) {
                OutputFormatter::warning(&format!(
                    "Skipped: symlink already exists at {}",
                    job.destination.display()
                ));
                return Ok(TransferOutcome::Skipped);
            }
            fs::hard_link(&job.source, &job.destination).map_err(|e| {
                OrganizeError::HardLinkFailed {
                    source_path: job.source.clone(),
                    destination: job.destination.clone(),
                    source: e,
                }
            })?;
            OutputFormatter::success(&format!(
                "Hard link created: {} to {}",
                job.source.display(),
                job.destination.display()
            ));
        }
        TransferStrategy::Symlink => {
            if is_symlink(&job.destination) {
                OutputFormatter::warning(&format!(
                    "Skipped: symlink already exists at {}",
                    job.destination.display()
                ));
                return Ok(TransferOutcome::Skipped);
            }
            create_symlink(&job.source, &job.destination).map_err(|e| {
                OrganizeError::SymlinkFailed {
                    source_path: job.source.clone(),
                    destination: job.destination.clone(),
                    source: e,
                }
            })?;
            OutputFormatter::success(&format!(
                "Symlink created: {} to {}",
                job.source.display(),
                job.destination.display()
            ));
        }
        TransferStrategy::Copy => {
            copy_with_metadata(&job.source, &job.destination)?;
            OutputFormatter::success(&format!(
                "Copied: {} to {}",
                job.source.display(),
                job.destination.display()
            ));
        }
    }

    Ok(TransferOutcome::Created)
}

/// Duplicates contents and permissions, then carries the source mtime over.
///
/// The mtime transfer is best effort: a filesystem that refuses timestamp
/// updates should not fail an otherwise completed copy.
fn copy_with_metadata(src: &Path, dst: &Path) -> OrganizeResult<()> {
    let copy_err = |e: io::Error| OrganizeError::CopyFailed {
        source_path: src.to_path_buf(),
        destination: dst.to_path_buf(),
        source: e,
    };

    let metadata = fs::metadata(src).map_err(copy_err)?;
    fs::copy(src, dst).map_err(copy_err)?;

    if let Ok(mtime) = metadata.modified() {
        let _ = filetime::set_file_mtime(dst, filetime::FileTime::from_system_time(mtime));
    }

    Ok(())
}

/// Checks the path itself (without following it) for a symbolic link.
fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

#[cfg(unix)]
fn create_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
fn create_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    // Windows distinguishes file and directory links, so the source's type
    // picks the flavor.
    if src.is_dir() {
        std::os::windows::fs::symlink_dir(src, dst)
    } else {
        std::os::windows::fs::symlink_file(src, dst)
    }
}
