//! Deployment unit lifecycle
//!
//! A deployment unit is the platform-native payload moving a package's
//! content onto a target system. The core drives create/upload/release/
//! import through the [`DeploymentUnits`] trait; release and import are
//! long-running remote operations bounded by deadline-driven polling.

pub mod sandbox;

use std::time::{Duration, Instant};

use crate::error::{DepotError, Result};

/// Import phases, in their mandatory order
///
/// Later phases reference objects declared by earlier ones, so the order
/// is strict: definitions, object assignments, translations, customizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ImportPhase {
    Definitions,
    ObjectAssignments,
    Translations,
    Customizing,
}

impl ImportPhase {
    /// All phases in import order
    pub const ORDERED: [ImportPhase; 4] = [
        ImportPhase::Definitions,
        ImportPhase::ObjectAssignments,
        ImportPhase::Translations,
        ImportPhase::Customizing,
    ];

    /// Phase name for messages
    pub fn as_str(self) -> &'static str {
        match self {
            ImportPhase::Definitions => "definitions",
            ImportPhase::ObjectAssignments => "object-assignments",
            ImportPhase::Translations => "translations",
            ImportPhase::Customizing => "customizing",
        }
    }
}

/// Handle to one deployment unit on the target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitHandle(pub String);

/// Observed state of a deployment unit
#[derive(Debug, Clone, Default)]
pub struct UnitStatus {
    /// Whether the unit has been released
    pub released: bool,

    /// Phases imported so far, in completion order
    pub imported: Vec<ImportPhase>,

    /// False once the unit is marked "do not reuse"
    pub usable: bool,
}

/// Lifecycle operations on deployment units
pub trait DeploymentUnits {
    /// Create an empty unit
    fn create(&self, description: &str) -> Result<UnitHandle>;

    /// Upload the payload into an open unit
    fn upload(&self, unit: &UnitHandle, payload: &[u8]) -> Result<()>;

    /// Start releasing the unit
    fn release(&self, unit: &UnitHandle) -> Result<()>;

    /// Start importing one phase of a released unit
    fn import(&self, unit: &UnitHandle, phase: ImportPhase) -> Result<()>;

    /// Current state of the unit
    fn status(&self, unit: &UnitHandle) -> Result<UnitStatus>;

    /// Mark the unit "do not reuse"
    ///
    /// Released units cannot be deleted; marking is the rollback of record.
    fn mark_unusable(&self, unit: &UnitHandle) -> Result<()>;

    /// Delete a unit that was never released
    fn delete(&self, unit: &UnitHandle) -> Result<()>;
}

/// Poll a unit until `done` observes the awaited state
///
/// Checks immediately, then at a fixed interval. Exceeding the deadline
/// raises a timeout error that takes the same rollback path as any other
/// step failure.
pub fn await_unit(
    units: &dyn DeploymentUnits,
    unit: &UnitHandle,
    operation: &str,
    deadline: Duration,
    done: impl Fn(&UnitStatus) -> bool,
) -> Result<()> {
    let started = Instant::now();
    let interval = Duration::from_millis(50);

    loop {
        let status = units.status(unit)?;
        if !status.usable {
            // A marked unit never progresses; fail instead of waiting out
            // the deadline.
            return Err(DepotError::DeploymentFailed {
                message: format!("unit '{}' is marked do-not-reuse", unit.0),
            });
        }
        if done(&status) {
            return Ok(());
        }

        if started.elapsed() >= deadline {
            return Err(DepotError::Timeout {
                operation: operation.to_string(),
                seconds: deadline.as_secs(),
            });
        }

        std::thread::sleep(interval);
    }
}
