//! Managed system errors

use super::DepotError;

/// Creates a not-authorized error
pub fn not_authorized(system: impl Into<String>) -> DepotError {
    DepotError::NotAuthorized {
        system: system.into(),
    }
}

/// Creates a system-state error
pub fn state_failed(message: impl Into<String>) -> DepotError {
    DepotError::SystemState {
        message: message.into(),
    }
}

/// Creates an unsupported-content error
pub fn unsupported_content(message: impl Into<String>) -> DepotError {
    DepotError::UnsupportedContent {
        message: message.into(),
    }
}

/// Creates a not-installed error
pub fn not_installed(name: impl Into<String>) -> DepotError {
    DepotError::NotInstalled { name: name.into() }
}
