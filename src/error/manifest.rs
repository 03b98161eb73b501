//! Manifest errors

use super::DepotError;

/// Creates a manifest-parse error
pub fn parse_failed(name: impl Into<String>, reason: impl Into<String>) -> DepotError {
    DepotError::ManifestParseFailed {
        name: name.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid-manifest error
pub fn invalid(message: impl Into<String>) -> DepotError {
    DepotError::ManifestInvalid {
        message: message.into(),
    }
}
