//! Registry errors

use super::DepotError;

/// Creates an unknown-registry error
pub fn not_found(name: impl Into<String>) -> DepotError {
    DepotError::RegistryNotFound { name: name.into() }
}

/// Creates a package-not-found error
pub fn package_not_found(name: impl Into<String>, registry: impl Into<String>) -> DepotError {
    DepotError::PackageNotFound {
        name: name.into(),
        registry: registry.into(),
    }
}

/// Creates a publish-failed error
pub fn publish_failed(name: impl Into<String>, reason: impl Into<String>) -> DepotError {
    DepotError::PublishFailed {
        name: name.into(),
        reason: reason.into(),
    }
}
