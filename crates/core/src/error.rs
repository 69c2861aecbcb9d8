//! Error types for Sieve.

use alloc::string::String;
use core::fmt;

/// Result type alias for Sieve operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for Sieve operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A filter mutation named a key that was never configured.
    InvalidFilterKey {
        key: String,
    },
    /// A sort direction outside the configured direction cycle.
    InvalidDirection {
        direction: String,
    },
    /// Extended JSON encoding or decoding failed.
    Serialization {
        message: String,
    },
    /// A reactive flush kept invalidating itself and was aborted.
    ReactiveLoop {
        reruns: usize,
    },
    /// Settings that can never produce a valid query.
    InvalidSettings {
        message: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidFilterKey { key } => {
                write!(f, "{} is not a valid filter", key)
            }
            Error::InvalidDirection { direction } => {
                write!(f, "Invalid sort direction: {}", direction)
            }
            Error::Serialization { message } => {
                write!(f, "Serialization error: {}", message)
            }
            Error::ReactiveLoop { reruns } => {
                write!(f, "Reactive flush aborted after {} reruns", reruns)
            }
            Error::InvalidSettings { message } => {
                write!(f, "Invalid settings: {}", message)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl Error {
    /// Creates an invalid filter key error.
    pub fn invalid_filter_key(key: impl Into<String>) -> Self {
        Error::InvalidFilterKey { key: key.into() }
    }

    /// Creates an invalid sort direction error.
    pub fn invalid_direction(direction: impl Into<String>) -> Self {
        Error::InvalidDirection {
            direction: direction.into(),
        }
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Error::Serialization {
            message: message.into(),
        }
    }

    /// Creates a reactive loop error.
    pub fn reactive_loop(reruns: usize) -> Self {
        Error::ReactiveLoop { reruns }
    }

    /// Creates an invalid settings error.
    pub fn invalid_settings(message: impl Into<String>) -> Self {
        Error::InvalidSettings {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        use alloc::string::ToString;
        Error::serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_error_display() {
        let err = Error::invalid_filter_key("status");
        assert!(err.to_string().contains("status"));

        let err = Error::invalid_direction("sideways");
        assert!(err.to_string().contains("sideways"));

        let err = Error::reactive_loop(1000);
        assert!(err.to_string().contains("1000"));
    }

    #[test]
    fn test_error_constructors() {
        match Error::invalid_filter_key("name") {
            Error::InvalidFilterKey { key } => assert_eq!(key, "name"),
            _ => panic!("Wrong error type"),
        }
    }
}
