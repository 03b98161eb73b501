//! Spinner display for long-running phases

use indicatif::{ProgressBar, ProgressStyle};

/// Spinner shown while fetching or importing
pub struct PhaseSpinner {
    pb: ProgressBar,
}

impl PhaseSpinner {
    /// Start a spinner with the given message
    pub fn start(message: impl Into<String>) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
            pb.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        pb.set_message(message.into());
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { pb }
    }

    /// Replace the message
    pub fn set_message(&self, message: impl Into<String>) {
        self.pb.set_message(message.into());
    }

    /// Stop and clear the spinner
    pub fn finish(self) {
        self.pb.finish_and_clear();
    }
}
