//! Cooperative cancellation for in-flight runs.
//!
//! A [`CancelToken`] is created by the caller, handed to the organizer, and
//! polled once per file between transfers. Setting it never interrupts an
//! in-flight filesystem operation; the current transfer always completes
//! before the run halts.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cloneable flag observed by the traversal loop between files.
///
/// Cloning is cheap; all clones share the same underlying flag.
///
/// # Examples
///
/// ```
/// use mediatidy::cancel::CancelToken;
///
/// let token = CancelToken::new();
/// assert!(!token.is_cancelled());
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a fresh, unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
