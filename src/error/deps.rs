//! Dependency errors

use super::DepotError;

/// Creates a dependency-not-found error
pub fn not_found(name: impl Into<String>, range: impl Into<String>) -> DepotError {
    DepotError::DependencyNotFound {
        name: name.into(),
        range: range.into(),
    }
}

/// Creates a missing-dependency error
pub fn missing(name: impl Into<String>) -> DepotError {
    DepotError::MissingDependency { name: name.into() }
}

/// Creates a dependents-exist error from the list of dependent package names
pub fn dependents_exist(name: impl Into<String>, dependents: &[String]) -> DepotError {
    DepotError::DependentsExist {
        name: name.into(),
        dependents: dependents.join(", "),
    }
}
