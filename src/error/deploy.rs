//! Deployment unit errors

use super::DepotError;

/// Creates a deployment-operation error
pub fn operation_failed(message: impl Into<String>) -> DepotError {
    DepotError::DeploymentFailed {
        message: message.into(),
    }
}

/// Creates a timeout error for a deadline-bounded remote operation
pub fn timeout(operation: impl Into<String>, seconds: u64) -> DepotError {
    DepotError::Timeout {
        operation: operation.into(),
        seconds,
    }
}
