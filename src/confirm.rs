//! Guarded source deletion.
//!
//! Removing the source tree is the only irreversible action in a run, so it
//! sits behind two sequential gates: a yes/no prompt naming the source root,
//! then a literal confirmation token. The prompts live behind the
//! [`ConfirmationProvider`] trait so tests can drive them deterministically.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::output::OutputFormatter;

/// The literal token the second gate requires.
pub const FINAL_CONFIRMATION_TOKEN: &str = "DELETE";

/// Capability for asking the operator to confirm destruction.
pub trait ConfirmationProvider {
    /// First gate: does the operator really want to delete `source_root`?
    fn confirm_intent(&mut self, source_root: &Path) -> io::Result<bool>;

    /// Second gate: did the operator type the literal confirmation token?
    fn confirm_final(&mut self) -> io::Result<bool>;
}

/// Interactive provider reading answers from stdin.
pub struct StdinConfirmation;

impl ConfirmationProvider for StdinConfirmation {
    fn confirm_intent(&mut self, source_root: &Path) -> io::Result<bool> {
        print!(
            "\nDo you really want to delete the source folder '{}'? (yes/no): ",
            source_root.display()
        );
        io::stdout().flush()?;
        let answer = read_line()?;
        Ok(answer.trim().eq_ignore_ascii_case("yes"))
    }

    fn confirm_final(&mut self) -> io::Result<bool> {
        print!(
            "This action is irreversible. Type '{}' to confirm: ",
            FINAL_CONFIRMATION_TOKEN
        );
        io::stdout().flush()?;
        let answer = read_line()?;
        Ok(answer.trim().to_uppercase() == FINAL_CONFIRMATION_TOKEN)
    }
}

fn read_line() -> io::Result<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

/// Final verdict of the deletion sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// Both gates passed and the source tree was removed.
    Deleted,
    /// A gate was answered negatively (or could not be read); nothing removed.
    Declined,
    /// Both gates passed but removal failed. The run itself has already
    /// succeeded, so this is reported without propagating.
    Failed,
}

/// Runs the two-gate deletion sequence against `source_root`.
///
/// The summary has already been printed by the time this runs; a removal
/// failure is announced but never turns a completed run into a failed one.
pub fn delete_source_tree(
    source_root: &Path,
    provider: &mut dyn ConfirmationProvider,
) -> DeletionOutcome {
    let intent = match provider.confirm_intent(source_root) {
        Ok(answer) => answer,
        Err(e) => {
            OutputFormatter::error(&format!("Could not read confirmation: {}", e));
            return DeletionOutcome::Declined;
        }
    };
    if !intent {
        OutputFormatter::plain("Deletion cancelled; source folder left in place.");
        return DeletionOutcome::Declined;
    }

    let confirmed = match provider.confirm_final() {
        Ok(answer) => answer,
        Err(e) => {
            OutputFormatter::error(&format!("Could not read confirmation: {}", e));
            return DeletionOutcome::Declined;
        }
    };
    if !confirmed {
        OutputFormatter::plain("Confirmation token did not match; source folder left in place.");
        return DeletionOutcome::Declined;
    }

    match fs::remove_dir_all(source_root) {
        Ok(()) => {
            OutputFormatter::success(&format!(
                "Source folder '{}' deleted.",
                source_root.display()
            ));
            DeletionOutcome::Deleted
        }
        Err(e) => {
            OutputFormatter::error(&format!(
                "Error deleting source folder '{}': {}",
                source_root.display(),
                e
            ));
            DeletionOutcome::Failed
        }
    }
}
