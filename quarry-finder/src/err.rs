use thiserror::Error;

use crate::method::MethodId;

pub type Result<T, E = FinderError> = std::result::Result<T, E>;

/// Errors raised while compiling or executing finder methods
#[derive(Debug, Error)]
pub enum FinderError {
    /// The method declaration violates the finder contract.
    /// Raised on first use and raised again on every later use.
    #[error("Invalid finder method {method}: {message}")]
    Definition { method: MethodId, message: String },
    /// The backing store failed to execute the query
    #[error("Failed to execute finder method {method}")]
    Execution {
        method: MethodId,
        #[source]
        source: quarry_core::err::Error,
    },
    /// The call supplied arguments the method cannot accept
    #[error("Invalid arguments for finder method {method}: {message}")]
    Argument { method: MethodId, message: String },
    /// An internal invariant was broken
    #[error("Internal finder error: {0}")]
    Internal(String),
    /// Executors or pools are misconfigured
    #[error("Finder configuration error: {0}")]
    Configuration(String),
}

impl FinderError {
    pub fn definition(method: &MethodId, message: impl Into<String>) -> Self {
        Self::Definition {
            method: method.clone(),
            message: message.into(),
        }
    }

    pub fn argument(method: &MethodId, message: impl Into<String>) -> Self {
        Self::Argument {
            method: method.clone(),
            message: message.into(),
        }
    }

    pub fn execution(method: &MethodId, source: quarry_core::err::Error) -> Self {
        Self::Execution {
            method: method.clone(),
            source,
        }
    }

    pub fn is_definition(&self) -> bool {
        matches!(self, Self::Definition { .. })
    }

    pub fn is_argument(&self) -> bool {
        matches!(self, Self::Argument { .. })
    }
}

/// Fails with a definition error unless the condition holds
macro_rules! check {
    ($method:expr, $cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::err::FinderError::definition($method, format!($($arg)+)));
        }
    };
}

pub(crate) use check;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use quarry_core::err::anyhow;

    use super::*;

    #[test]
    fn test_finder_error_display() {
        let id = MethodId::new("PersonRepository", "find_all");

        assert_eq!(
            FinderError::definition(&id, "Duplicate placeholder 'x'").to_string(),
            "Invalid finder method PersonRepository#find_all: Duplicate placeholder 'x'"
        );
        assert_eq!(
            FinderError::Configuration("No executor".into()).to_string(),
            "Finder configuration error: No executor"
        );
    }

    #[test]
    fn test_finder_error_execution_preserves_cause() {
        let id = MethodId::new("PersonRepository", "find_all");
        let err = FinderError::execution(&id, anyhow!("Unknown table \"Person\""));

        assert_eq!(
            err.source().unwrap().to_string(),
            "Unknown table \"Person\""
        );
    }

    #[test]
    fn test_finder_error_into_anyhow() {
        fn fails() -> quarry_core::err::Result<()> {
            Err(FinderError::Internal("broken".into()).into())
        }

        let err = fails().unwrap_err();

        assert!(matches!(
            err.downcast_ref::<FinderError>(),
            Some(FinderError::Internal(_))
        ));
    }
}
