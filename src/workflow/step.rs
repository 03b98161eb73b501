//! Step contract for workflow execution

use crate::error::Result;

/// A unit of work in a workflow
///
/// `filter` decides whether the step runs at all; skipped steps get no
/// rollback entry. `run` performs the effect and may fail. `revert` is the
/// best-effort compensation, invoked only when `run` completed and a later
/// step failed.
///
/// Steps hold no state of their own between runs; everything flows through
/// the context.
pub trait Step<C> {
    /// Step name for the ledger and log output
    fn name(&self) -> &'static str;

    /// Whether the step should run for this context (default: run)
    fn filter(&self, ctx: &C) -> bool {
        let _ = ctx;
        true
    }

    /// Perform the step's effect
    fn run(&self, ctx: &mut C) -> Result<()>;

    /// Compensate the step's effect during rollback
    ///
    /// Must be idempotent and must never prevent sibling reverts from
    /// running; failures are logged by the engine, not escalated.
    fn revert(&self, ctx: &mut C) -> Result<()> {
        let _ = ctx;
        Ok(())
    }
}
