//! Content integrity errors

use super::DepotError;

/// Creates an integrity-mismatch error
pub fn mismatch(
    name: impl Into<String>,
    expected: impl Into<String>,
    actual: impl Into<String>,
) -> DepotError {
    DepotError::IntegrityMismatch {
        name: name.into(),
        expected: expected.into(),
        actual: actual.into(),
    }
}
