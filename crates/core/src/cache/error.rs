use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The backend could not be reached at all (refused, timed out, dropped).
    /// Callers treat this as a miss.
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
    #[error("Cache operation failed: {0}")]
    OperationFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CacheError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, CacheError::Unavailable(_))
    }
}

impl From<super::SerializationError> for CacheError {
    fn from(err: super::SerializationError) -> Self {
        CacheError::Serialization(err.to_string())
    }
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SerializationError;

    #[test]
    fn test_unavailable_display() {
        let error = CacheError::Unavailable("connection refused".to_string());
        assert_eq!(error.to_string(), "Cache unavailable: connection refused");
        assert!(error.is_unavailable());
    }

    #[test]
    fn test_operation_failed_is_not_unavailable() {
        let error = CacheError::OperationFailed("WRONGTYPE".to_string());
        assert_eq!(error.to_string(), "Cache operation failed: WRONGTYPE");
        assert!(!error.is_unavailable());
    }

    #[test]
    fn test_from_serialization_error() {
        let error: CacheError = SerializationError::DeserializeFailed("eof".to_string()).into();
        assert_eq!(
            error,
            CacheError::Serialization("Failed to deserialize: eof".to_string())
        );
    }
}
