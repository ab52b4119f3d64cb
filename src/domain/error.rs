//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Domain-specific errors
///
/// Aggregation itself cannot fail; the only domain error is a request
/// for a statistics period that does not exist.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Statistics requested for an unsupported period token
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
}

impl DomainError {
    /// Create an invalid period error
    pub fn invalid_period(token: impl Into<String>) -> Self {
        Self::InvalidPeriod(token.into())
    }

    /// Check if this is a client error (user's fault)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidPeriod(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_period_error() {
        let err = DomainError::invalid_period("weekly");

        assert!(err.is_client_error());
        assert_eq!(err, DomainError::InvalidPeriod("weekly".to_string()));
        assert!(err.to_string().contains("weekly"));
    }
}
