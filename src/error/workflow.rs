//! Workflow engine errors

use super::DepotError;

/// Wraps a foreign error with the name of the step that raised it.
///
/// The engine itself never applies this wrapper; rollback always surfaces
/// the failing step's original error unchanged.
pub fn step_failed(step: impl Into<String>, source: DepotError) -> DepotError {
    DepotError::WorkflowStep {
        step: step.into(),
        source: Box::new(source),
    }
}
