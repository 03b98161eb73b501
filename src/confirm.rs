//! Confirmation gates
//!
//! Every destructive phase is preceded by a confirmation that can be
//! bypassed in unattended mode. Declining aborts the whole operation
//! before any destructive step runs.

use inquire::Confirm;

use crate::error::{DepotError, Result};

/// Asks the user to confirm an action
pub trait Confirmation {
    /// Returns whether the user accepted
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// Terminal prompt via inquire
pub struct InteractiveConfirmation;

impl Confirmation for InteractiveConfirmation {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        Confirm::new(prompt)
            .with_default(true)
            .with_help_message("Press Enter to confirm, or 'n' to cancel")
            .prompt()
            .map_err(|e| DepotError::IoError {
                message: format!("Failed to read confirmation: {e}"),
            })
    }
}

/// Accepts everything; used with --yes and in unattended runs
pub struct UnattendedConfirmation;

impl Confirmation for UnattendedConfirmation {
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}
