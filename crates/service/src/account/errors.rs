use thiserror::Error;

/// Business errors for account workflows
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("email already registered")]
    Conflict,
    #[error("invalid credentials")]
    Unauthorized,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AccountError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AccountError::Validation(_) => 1001,
            AccountError::Conflict => 1002,
            AccountError::Unauthorized => 1004,
            AccountError::HashError(_) => 1101,
            AccountError::Repository(_) => 1200,
        }
    }
}

impl From<crate::errors::ServiceError> for AccountError {
    fn from(err: crate::errors::ServiceError) -> Self {
        use crate::errors::ServiceError;
        match err {
            ServiceError::Conflict(_) => AccountError::Conflict,
            e if e.is_validation() => AccountError::Validation(e.to_string()),
            other => AccountError::Repository(other.to_string()),
        }
    }
}
