//! Core error types for fedauthz.

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Role value of a person is not a string or a non-empty list of strings
    #[error("Invalid roles: {reason}")]
    InvalidRoles {
        /// What was wrong with the supplied value
        reason: String,
    },
}
