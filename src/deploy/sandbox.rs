//! JSON-state sandbox deployment units
//!
//! Units live in `units.json` under the sandbox directory. Release and
//! import complete immediately; the polling loops in the orchestrations
//! still observe completion through `status`.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::deploy::{DeploymentUnits, ImportPhase, UnitHandle, UnitStatus};
use crate::error::{DepotError, Result};
use crate::hash;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UnitRecord {
    description: String,
    payload_digest: Option<String>,
    released: bool,
    imported: Vec<ImportPhase>,
    usable: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UnitsState {
    next_id: u32,
    units: BTreeMap<String, UnitRecord>,
}

/// Sandbox implementation of [`DeploymentUnits`]
pub struct SandboxUnits {
    root: PathBuf,
    state: RefCell<UnitsState>,
}

impl SandboxUnits {
    /// Open the unit store under `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        let path = root.join("units.json");
        let state = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| DepotError::FileReadFailed {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            serde_json::from_str(&content).map_err(|e| DepotError::DeploymentFailed {
                message: format!("corrupt unit state: {e}"),
            })?
        } else {
            UnitsState::default()
        };

        Ok(Self {
            root,
            state: RefCell::new(state),
        })
    }

    fn save(&self) -> Result<()> {
        let path = self.root.join("units.json");
        let json =
            serde_json::to_string_pretty(&*self.state.borrow()).map_err(|e| {
                DepotError::DeploymentFailed {
                    message: format!("failed to encode unit state: {e}"),
                }
            })?;
        fs::write(&path, json).map_err(|e| DepotError::FileWriteFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn with_unit<T>(
        &self,
        unit: &UnitHandle,
        f: impl FnOnce(&mut UnitRecord) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.state.borrow_mut();
        let record = state
            .units
            .get_mut(&unit.0)
            .ok_or_else(|| DepotError::DeploymentFailed {
                message: format!("unknown deployment unit '{}'", unit.0),
            })?;
        f(record)
    }
}

impl DeploymentUnits for SandboxUnits {
    fn create(&self, description: &str) -> Result<UnitHandle> {
        let id = {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            let id = format!("DU{:04}", state.next_id);
            state.units.insert(
                id.clone(),
                UnitRecord {
                    description: description.to_string(),
                    payload_digest: None,
                    released: false,
                    imported: vec![],
                    usable: true,
                },
            );
            id
        };
        self.save()?;
        Ok(UnitHandle(id))
    }

    fn upload(&self, unit: &UnitHandle, payload: &[u8]) -> Result<()> {
        self.with_unit(unit, |record| {
            if record.released {
                return Err(DepotError::DeploymentFailed {
                    message: format!("unit '{}' is already released", unit.0),
                });
            }
            record.payload_digest = Some(hash::digest_bytes(payload));
            Ok(())
        })?;
        self.save()
    }

    fn release(&self, unit: &UnitHandle) -> Result<()> {
        self.with_unit(unit, |record| {
            if record.payload_digest.is_none() {
                return Err(DepotError::DeploymentFailed {
                    message: format!("unit '{}' has no payload", unit.0),
                });
            }
            record.released = true;
            Ok(())
        })?;
        self.save()
    }

    fn import(&self, unit: &UnitHandle, phase: ImportPhase) -> Result<()> {
        self.with_unit(unit, |record| {
            if !record.released {
                return Err(DepotError::DeploymentFailed {
                    message: format!("unit '{}' is not released", unit.0),
                });
            }
            if !record.usable {
                return Err(DepotError::DeploymentFailed {
                    message: format!("unit '{}' is marked do-not-reuse", unit.0),
                });
            }
            if !record.imported.contains(&phase) {
                record.imported.push(phase);
            }
            Ok(())
        })?;
        self.save()
    }

    fn status(&self, unit: &UnitHandle) -> Result<UnitStatus> {
        self.with_unit(unit, |record| {
            Ok(UnitStatus {
                released: record.released,
                imported: record.imported.clone(),
                usable: record.usable,
            })
        })
    }

    fn mark_unusable(&self, unit: &UnitHandle) -> Result<()> {
        self.with_unit(unit, |record| {
            record.usable = false;
            Ok(())
        })?;
        self.save()
    }

    fn delete(&self, unit: &UnitHandle) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            let record =
                state
                    .units
                    .get(&unit.0)
                    .ok_or_else(|| DepotError::DeploymentFailed {
                        message: format!("unknown deployment unit '{}'", unit.0),
                    })?;
            if record.released {
                return Err(DepotError::DeploymentFailed {
                    message: format!("unit '{}' is released and cannot be deleted", unit.0),
                });
            }
            state.units.remove(&unit.0);
        }
        self.save()
    }
}
