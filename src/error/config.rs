//! Configuration errors

use super::DepotError;

/// Creates a config-read error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> DepotError {
    DepotError::ConfigReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates a config-parse error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> DepotError {
    DepotError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}
