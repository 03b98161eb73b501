//! Lockfile errors

use super::DepotError;

/// Creates a lockfile-parse error
pub fn parse_failed(reason: impl Into<String>) -> DepotError {
    DepotError::LockfileParseFailed {
        reason: reason.into(),
    }
}
