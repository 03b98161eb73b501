//! Rollback ledger for workflow runs
//!
//! Each step gets an explicit outcome rather than mere membership in a
//! completed stack, so skipped steps are distinguishable from completed
//! ones when the engine decides what to unwind.

/// Outcome of one step within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Filter returned false; no rollback entry
    Skipped,
    /// Ran to completion
    Completed,
    /// Run failed; triggered rollback
    Failed,
    /// Compensation ran after a later failure
    Reverted,
    /// Compensation itself failed; manual cleanup may be needed
    RevertFailed,
}

/// Record of one step's execution
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// Step name
    pub name: &'static str,
    /// Current outcome
    pub outcome: StepOutcome,
}

/// Ledger tracking every step of a workflow run
#[derive(Debug, Default)]
pub struct Ledger {
    records: Vec<StepRecord>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a step outcome
    pub(crate) fn record(&mut self, name: &'static str, outcome: StepOutcome) {
        self.records.push(StepRecord { name, outcome });
    }

    /// Update a previously recorded step's outcome
    pub(crate) fn update(&mut self, name: &'static str, outcome: StepOutcome) {
        if let Some(record) = self.records.iter_mut().rev().find(|r| r.name == name) {
            record.outcome = outcome;
        }
    }

    /// All records in execution order
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// Whether any compensation failed during rollback
    pub fn any_revert_failed(&self) -> bool {
        self.records
            .iter()
            .any(|r| r.outcome == StepOutcome::RevertFailed)
    }

    /// One-line-per-step summary for display
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for record in self.records() {
            let marker = match record.outcome {
                StepOutcome::Skipped => "-",
                StepOutcome::Completed => "✓",
                StepOutcome::Failed => "✗",
                StepOutcome::Reverted => "↩",
                StepOutcome::RevertFailed => "⚠",
            };
            lines.push(format!("{marker} {}", record.name));
        }
        lines.join("\n")
    }
}
