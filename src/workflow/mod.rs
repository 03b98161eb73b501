//! Step-workflow engine with compensating rollback
//!
//! Every multi-phase operation (install, publish, dependency check) runs as
//! an ordered list of steps against one context. Managed systems rarely
//! support true transactions once certain side effects occur, so on failure
//! the engine unwinds completed steps in reverse with best-effort
//! compensations and returns the original error.

pub mod context;
pub mod executor;
pub mod ledger;
pub mod step;

pub use context::Context;
pub use executor::Workflow;
pub use ledger::{Ledger, StepOutcome, StepRecord};
pub use step::Step;
