//! Workflow executor with reverse-order compensating rollback

use tracing::{debug, warn};

use crate::error::Result;
use crate::workflow::ledger::{Ledger, StepOutcome};
use crate::workflow::step::Step;

/// An ordered list of steps executed against one context
pub struct Workflow<C> {
    name: String,
    steps: Vec<Box<dyn Step<C>>>,
}

impl<C> Workflow<C> {
    /// Create an empty workflow
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step
    #[must_use]
    pub fn step(mut self, step: impl Step<C> + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Execute all steps in order, returning the final context on success
    ///
    /// On a step failure, previously completed steps are reverted in
    /// reverse order and the failing step's original error is returned
    /// unchanged. The context is dropped on failure; a partial output is
    /// never observable.
    pub fn execute(&self, ctx: C) -> Result<C> {
        self.execute_with_ledger(ctx).0
    }

    /// Execute and return both the result and the step ledger
    ///
    /// The ledger lets callers warn about failed compensations (possible
    /// manual cleanup) without the error itself being reclassified.
    pub fn execute_with_ledger(&self, mut ctx: C) -> (Result<C>, Ledger) {
        let mut ledger = Ledger::new();
        let mut completed: Vec<usize> = Vec::new();

        for (index, step) in self.steps.iter().enumerate() {
            if !step.filter(&ctx) {
                debug!(workflow = %self.name, step = step.name(), "step skipped");
                ledger.record(step.name(), StepOutcome::Skipped);
                continue;
            }

            debug!(workflow = %self.name, step = step.name(), "step running");
            match step.run(&mut ctx) {
                Ok(()) => {
                    ledger.record(step.name(), StepOutcome::Completed);
                    completed.push(index);
                }
                Err(error) => {
                    ledger.record(step.name(), StepOutcome::Failed);
                    self.rollback(&mut ctx, &completed, &mut ledger);
                    return (Err(error), ledger);
                }
            }
        }

        (Ok(ctx), ledger)
    }

    /// Revert completed steps in reverse order
    ///
    /// Every completed step gets its rollback attempt even when an earlier
    /// compensation fails. Revert errors are logged, never escalated.
    fn rollback(&self, ctx: &mut C, completed: &[usize], ledger: &mut Ledger) {
        for &index in completed.iter().rev() {
            let step = &self.steps[index];
            match step.revert(ctx) {
                Ok(()) => {
                    debug!(workflow = %self.name, step = step.name(), "step reverted");
                    ledger.update(step.name(), StepOutcome::Reverted);
                }
                Err(revert_error) => {
                    warn!(
                        workflow = %self.name,
                        step = step.name(),
                        error = %revert_error,
                        "revert failed, manual cleanup may be needed"
                    );
                    ledger.update(step.name(), StepOutcome::RevertFailed);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::error::DepotError;

    #[derive(Default, Debug)]
    struct TestContext {
        log: Rc<RefCell<Vec<String>>>,
        skip_optional: bool,
        output: Option<String>,
    }

    struct RecordingStep {
        name: &'static str,
        fail: bool,
        fail_revert: bool,
    }

    impl RecordingStep {
        fn ok(name: &'static str) -> Self {
            Self {
                name,
                fail: false,
                fail_revert: false,
            }
        }

        fn failing(name: &'static str) -> Self {
            Self {
                name,
                fail: true,
                fail_revert: false,
            }
        }

        fn bad_revert(name: &'static str) -> Self {
            Self {
                name,
                fail: false,
                fail_revert: true,
            }
        }
    }

    impl Step<TestContext> for RecordingStep {
        fn name(&self) -> &'static str {
            self.name
        }

        fn run(&self, ctx: &mut TestContext) -> Result<()> {
            if self.fail {
                return Err(DepotError::SystemState {
                    message: format!("{} blew up", self.name),
                });
            }
            ctx.log.borrow_mut().push(format!("run {}", self.name));
            Ok(())
        }

        fn revert(&self, ctx: &mut TestContext) -> Result<()> {
            if self.fail_revert {
                return Err(DepotError::SystemState {
                    message: format!("revert of {} failed", self.name),
                });
            }
            ctx.log.borrow_mut().push(format!("revert {}", self.name));
            Ok(())
        }
    }

    struct OptionalStep;

    impl Step<TestContext> for OptionalStep {
        fn name(&self) -> &'static str {
            "optional"
        }

        fn filter(&self, ctx: &TestContext) -> bool {
            !ctx.skip_optional
        }

        fn run(&self, ctx: &mut TestContext) -> Result<()> {
            ctx.log.borrow_mut().push("run optional".to_string());
            Ok(())
        }

        fn revert(&self, ctx: &mut TestContext) -> Result<()> {
            ctx.log.borrow_mut().push("revert optional".to_string());
            Ok(())
        }
    }

    struct FinalizeStep;

    impl Step<TestContext> for FinalizeStep {
        fn name(&self) -> &'static str {
            "finalize"
        }

        fn run(&self, ctx: &mut TestContext) -> Result<()> {
            ctx.output = Some("done".to_string());
            Ok(())
        }
    }

    #[test]
    fn test_all_steps_run_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let ctx = TestContext {
            log: Rc::clone(&log),
            ..TestContext::default()
        };

        let workflow = Workflow::new("test")
            .step(RecordingStep::ok("first"))
            .step(RecordingStep::ok("second"))
            .step(FinalizeStep);

        let result = workflow.execute(ctx).unwrap();

        assert_eq!(result.output.as_deref(), Some("done"));
        assert_eq!(
            *log.borrow(),
            vec!["run first".to_string(), "run second".to_string()]
        );
    }

    #[test]
    fn test_failure_reverts_completed_steps_in_reverse() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let ctx = TestContext {
            log: Rc::clone(&log),
            ..TestContext::default()
        };

        let workflow = Workflow::new("test")
            .step(RecordingStep::ok("first"))
            .step(RecordingStep::ok("second"))
            .step(RecordingStep::failing("third"));

        let result = workflow.execute(ctx);

        assert!(result.is_err());
        assert_eq!(
            *log.borrow(),
            vec![
                "run first".to_string(),
                "run second".to_string(),
                "revert second".to_string(),
                "revert first".to_string(),
            ]
        );
    }

    #[test]
    fn test_original_error_survives_failed_revert() {
        // 5-step run: step 3 fails, step 2's revert fails, step 1's revert
        // still runs, and the caller sees step 3's error.
        let log = Rc::new(RefCell::new(Vec::new()));
        let ctx = TestContext {
            log: Rc::clone(&log),
            ..TestContext::default()
        };

        let workflow = Workflow::new("test")
            .step(RecordingStep::ok("first"))
            .step(RecordingStep::bad_revert("second"))
            .step(RecordingStep::failing("third"))
            .step(RecordingStep::ok("fourth"))
            .step(RecordingStep::ok("fifth"));

        let (result, ledger) = workflow.execute_with_ledger(ctx);

        let err = result.expect_err("step 3 must fail the run");
        assert!(err.to_string().contains("third blew up"));

        assert_eq!(
            *log.borrow(),
            vec![
                "run first".to_string(),
                "run second".to_string(),
                "revert first".to_string(),
            ]
        );

        assert!(ledger.any_revert_failed());
        let outcomes: Vec<_> = ledger.records().iter().map(|r| (r.name, r.outcome)).collect();
        assert_eq!(outcomes[0], ("first", StepOutcome::Reverted));
        assert_eq!(outcomes[1], ("second", StepOutcome::RevertFailed));
        assert_eq!(outcomes[2], ("third", StepOutcome::Failed));
        assert_eq!(outcomes.len(), 3);
    }

    #[test]
    fn test_skipped_steps_get_no_rollback() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let ctx = TestContext {
            log: Rc::clone(&log),
            skip_optional: true,
            ..TestContext::default()
        };

        let workflow = Workflow::new("test")
            .step(OptionalStep)
            .step(RecordingStep::failing("boom"));

        let (result, ledger) = workflow.execute_with_ledger(ctx);

        assert!(result.is_err());
        // The optional step never ran, so nothing reverts it
        assert!(log.borrow().is_empty());
        assert_eq!(ledger.records()[0].outcome, StepOutcome::Skipped);
    }

    #[test]
    fn test_first_step_failure_needs_no_rollback() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let ctx = TestContext {
            log: Rc::clone(&log),
            ..TestContext::default()
        };

        let workflow = Workflow::new("test").step(RecordingStep::failing("first"));
        let result = workflow.execute(ctx);

        assert!(result.is_err());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_empty_workflow_returns_context() {
        let ctx = TestContext::default();
        let workflow = Workflow::new("empty");
        assert!(workflow.execute(ctx).is_ok());
    }
}
