//! Progress and confirmation callbacks
//!
//! These traits allow the declarative crate to be used without
//! depending on a specific terminal UI.

use crate::error::Error;
use crate::types::Outcome;

/// Progress callback for execution operations
///
/// Implement this trait to receive progress updates during execution.
pub trait ProgressCallback: Send {
    /// Called when starting a pass over `count` resources
    fn on_batch_start(&mut self, count: usize, dry_run: bool);

    /// Called when starting to reconcile a single resource
    fn on_resource_start(&mut self, id: &str);

    /// Called when a resource was reconciled
    fn on_resource_complete(&mut self, outcome: &Outcome);

    /// Called when a resource could not be reconciled
    fn on_resource_failed(&mut self, id: &str, error: &Error);

    /// Called when a dry run defers a resource that depends on earlier changes
    fn on_resource_deferred(&mut self, _id: &str, _error: &Error) {}

    /// Called when a pass completes
    fn on_batch_complete(&mut self);
}

/// Confirmation callback for user interaction
pub trait ConfirmCallback: Send {
    /// Ask the user to confirm an action
    ///
    /// # Returns
    /// `true` if the user confirmed, `false` otherwise
    fn confirm(&mut self, prompt: &str) -> std::io::Result<bool>;

    /// Whether `confirm` actually asks. When it does not, plans are applied
    /// in a single pass without a preview.
    fn needs_prompt(&self) -> bool {
        true
    }
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_batch_start(&mut self, _count: usize, _dry_run: bool) {}
    fn on_resource_start(&mut self, _id: &str) {}
    fn on_resource_complete(&mut self, _outcome: &Outcome) {}
    fn on_resource_failed(&mut self, _id: &str, _error: &Error) {}
    fn on_batch_complete(&mut self) {}
}

/// Auto-confirm callback (always returns true)
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> std::io::Result<bool> {
        Ok(true)
    }

    fn needs_prompt(&self) -> bool {
        false
    }
}

/// Auto-decline callback (always returns false)
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> std::io::Result<bool> {
        Ok(false)
    }
}
