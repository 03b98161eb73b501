//! Error types and handling for Depot
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`deps`]: Dependency resolution errors
//! - [`integrity`]: Content integrity errors
//! - [`registry`]: Registry errors
//! - [`system`]: Managed system errors
//! - [`deploy`]: Deployment unit errors
//! - [`workflow`]: Workflow engine errors
//! - [`manifest`]: Manifest errors
//! - [`lockfile`]: Lockfile errors
//! - [`config`]: Configuration errors
//! - [`fs`]: File system errors

#![allow(dead_code)]

pub mod config;
pub mod deploy;
pub mod deps;
pub mod fs;
pub mod integrity;
pub mod lockfile;
pub mod manifest;
pub mod registry;
pub mod system;
pub mod workflow;

// Re-export convenience constructors from submodules
#[allow(unused_imports)]
pub use config::{parse_failed as config_parse_failed, read_failed as config_read_failed};
#[allow(unused_imports)]
pub use deploy::{operation_failed as deploy_failed, timeout};
#[allow(unused_imports)]
pub use deps::{
    dependents_exist, missing as missing_dependency, not_found as dependency_not_found,
};
#[allow(unused_imports)]
pub use fs::{io_error, read_failed as file_read_failed, write_failed as file_write_failed};
#[allow(unused_imports)]
pub use integrity::mismatch as integrity_mismatch;
#[allow(unused_imports)]
pub use lockfile::parse_failed as lockfile_parse_failed;
#[allow(unused_imports)]
pub use manifest::{invalid as manifest_invalid, parse_failed as manifest_parse_failed};
#[allow(unused_imports)]
pub use registry::{not_found as registry_not_found, package_not_found, publish_failed};
#[allow(unused_imports)]
pub use system::{not_authorized, state_failed as system_state_failed, unsupported_content};
#[allow(unused_imports)]
pub use workflow::step_failed as workflow_step_failed;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for Depot operations
#[derive(Error, Diagnostic, Debug)]
pub enum DepotError {
    // Install short-circuit
    #[error("Package '{name}' version {version} is already installed")]
    #[diagnostic(
        code(depot::install::already_installed),
        help("Use --force to reinstall the same version")
    )]
    AlreadyInstalled { name: String, version: String },

    // Dependency errors
    #[error("Dependency '{name}' not found: no release satisfies '{range}'")]
    #[diagnostic(
        code(depot::deps::not_found),
        help("Check the dependency name and version range against the registry")
    )]
    DependencyNotFound { name: String, range: String },

    #[error("Missing dependency: {name}")]
    #[diagnostic(code(depot::deps::missing))]
    MissingDependency { name: String },

    #[error("Cannot remove '{name}': still required by {dependents}")]
    #[diagnostic(
        code(depot::deps::dependents_exist),
        help("Remove the dependent packages first")
    )]
    DependentsExist { name: String, dependents: String },

    // Integrity errors
    #[error("Integrity mismatch for '{name}': expected {expected}, got {actual}")]
    #[diagnostic(
        code(depot::integrity::mismatch),
        help("The artifact content differs from the declared hash. Do not install it.")
    )]
    IntegrityMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    // Registry errors
    #[error("Registry '{name}' is not configured")]
    #[diagnostic(
        code(depot::registry::not_found),
        help("Add the registry to your Depot configuration")
    )]
    RegistryNotFound { name: String },

    #[error("Package '{name}' not found in registry '{registry}'")]
    #[diagnostic(code(depot::registry::package_not_found))]
    PackageNotFound { name: String, registry: String },

    #[error("Failed to publish '{name}': {reason}")]
    #[diagnostic(code(depot::registry::publish_failed))]
    PublishFailed { name: String, reason: String },

    // Managed system errors
    #[error("Not authorized against system '{system}'")]
    #[diagnostic(
        code(depot::system::not_authorized),
        help("Check your credentials for the target system")
    )]
    NotAuthorized { system: String },

    #[error("System state operation failed: {message}")]
    #[diagnostic(code(depot::system::state_failed))]
    SystemState { message: String },

    #[error("Package '{name}' is not installed")]
    #[diagnostic(code(depot::system::not_installed))]
    NotInstalled { name: String },

    #[error("Unsupported content: {message}")]
    #[diagnostic(
        code(depot::system::unsupported_content),
        help("The target system lacks a required type or prerequisite component")
    )]
    UnsupportedContent { message: String },

    // Deployment unit errors
    #[error("Deployment unit operation failed: {message}")]
    #[diagnostic(code(depot::deploy::operation_failed))]
    DeploymentFailed { message: String },

    #[error("Timed out after {seconds}s waiting for {operation}")]
    #[diagnostic(
        code(depot::deploy::timeout),
        help("The remote operation did not finish within the deadline")
    )]
    Timeout { operation: String, seconds: u64 },

    // Workflow errors
    #[error("Workflow step '{step}' failed")]
    #[diagnostic(code(depot::workflow::step_failed))]
    WorkflowStep {
        step: String,
        #[source]
        source: Box<DepotError>,
    },

    #[error("Operation aborted")]
    #[diagnostic(code(depot::workflow::user_aborted))]
    UserAborted,

    // Manifest errors
    #[error("Failed to parse manifest for '{name}': {reason}")]
    #[diagnostic(code(depot::manifest::parse_failed))]
    ManifestParseFailed { name: String, reason: String },

    #[error("Invalid manifest: {message}")]
    #[diagnostic(code(depot::manifest::invalid))]
    ManifestInvalid { message: String },

    // Lockfile errors
    #[error("Lockfile is missing")]
    #[diagnostic(
        code(depot::lockfile::missing),
        help("Run 'depot lock write' to generate a lockfile")
    )]
    LockfileMissing,

    #[error("Failed to parse lockfile: {reason}")]
    #[diagnostic(code(depot::lockfile::parse_failed))]
    LockfileParseFailed { reason: String },

    // Configuration errors
    #[error("Failed to read configuration file: {path}")]
    #[diagnostic(code(depot::config::read_failed))]
    ConfigReadFailed { path: String, reason: String },

    #[error("Failed to parse configuration file: {path}")]
    #[diagnostic(code(depot::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    // File system errors
    #[error("Failed to read file: {path}")]
    #[diagnostic(code(depot::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}")]
    #[diagnostic(code(depot::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(depot::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for DepotError {
    fn from(err: std::io::Error) -> Self {
        DepotError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for DepotError {
    fn from(err: serde_yaml::Error) -> Self {
        DepotError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for DepotError {
    fn from(err: serde_json::Error) -> Self {
        DepotError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<inquire::InquireError> for DepotError {
    fn from(err: inquire::InquireError) -> Self {
        DepotError::IoError {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, DepotError>;
