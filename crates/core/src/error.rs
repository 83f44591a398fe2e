//! Error types for docmap
//!
//! One shared error enum covers the whole mapper: store command failures,
//! duplicate-key conflicts, and the two lock failure modes. We use `thiserror`
//! for automatic `Display` and `Error` trait implementations.
//!
//! Lock failures are deliberately their own variants so callers can tell
//! "someone else holds the lock" apart from a failing store without parsing
//! message strings.

use thiserror::Error;

/// Result type alias for docmap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the document mapper
#[derive(Debug, Error)]
pub enum Error {
    /// Unique-constraint violation on insert
    #[error("duplicate key \"{id}\" in collection \"{collection}\"")]
    DuplicateKey {
        /// Collection the insert targeted
        collection: String,
        /// Identifier that already exists
        id: String,
    },

    /// A document expected to exist was not found
    #[error("model with id \"{id}\" was not found")]
    ModelNotFound {
        /// Identifier that was looked up
        id: String,
    },

    /// Non-blocking lock attempt hit an already-held lock
    #[error("Cannot obtain the lock for id \"{id}\"")]
    LockContention {
        /// Identifier of the contended resource
        id: String,
    },

    /// Blocking lock attempt exceeded its deadline
    #[error("Cannot obtain the lock for id \"{id}\". Timeout after {seconds} seconds")]
    LockTimeout {
        /// Identifier of the contended resource
        id: String,
        /// Configured wait limit in seconds
        seconds: u64,
    },

    /// Invalid operation or state
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Store command or connectivity failure
    #[error("collection command failed: {0}")]
    Command(String),
}

impl Error {
    /// True for both lock failure modes (contention and timeout)
    pub fn is_lock_failure(&self) -> bool {
        matches!(
            self,
            Error::LockContention { .. } | Error::LockTimeout { .. }
        )
    }

    /// True when an insert lost to the unique constraint
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Error::DuplicateKey { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_duplicate_key() {
        let err = Error::DuplicateKey {
            collection: "orders".to_string(),
            id: "42".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("duplicate key"));
        assert!(msg.contains("\"42\""));
        assert!(msg.contains("\"orders\""));
    }

    #[test]
    fn test_error_display_model_not_found() {
        let err = Error::ModelNotFound {
            id: "abc".to_string(),
        };
        assert!(err.to_string().contains("\"abc\""));
    }

    #[test]
    fn test_error_display_lock_contention() {
        let err = Error::LockContention {
            id: "7".to_string(),
        };
        assert_eq!(err.to_string(), "Cannot obtain the lock for id \"7\"");
    }

    #[test]
    fn test_error_display_lock_timeout_exact_message() {
        let err = Error::LockTimeout {
            id: "2".to_string(),
            seconds: 2,
        };
        assert_eq!(
            err.to_string(),
            "Cannot obtain the lock for id \"2\". Timeout after 2 seconds"
        );
    }

    #[test]
    fn test_error_display_invalid_operation() {
        let err = Error::InvalidOperation("model has no identifier".to_string());
        assert!(err.to_string().contains("model has no identifier"));
    }

    #[test]
    fn test_is_lock_failure() {
        assert!(Error::LockContention {
            id: "1".to_string()
        }
        .is_lock_failure());
        assert!(Error::LockTimeout {
            id: "1".to_string(),
            seconds: 5
        }
        .is_lock_failure());
        assert!(!Error::Command("down".to_string()).is_lock_failure());
    }

    #[test]
    fn test_is_duplicate_key() {
        let err = Error::DuplicateKey {
            collection: "c".to_string(),
            id: "1".to_string(),
        };
        assert!(err.is_duplicate_key());
        assert!(!Error::ModelNotFound {
            id: "1".to_string()
        }
        .is_duplicate_key());
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }

        fn returns_error() -> Result<i32> {
            Err(Error::Command("test".to_string()))
        }

        assert_eq!(returns_result().unwrap(), 42);
        assert!(returns_error().is_err());
    }
}
