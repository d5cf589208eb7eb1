//! Error taxonomy for the engine.
//!
//! Every failure is local and synchronous: nothing is retried internally,
//! the caller decides whether to re-initialize.

/// Errors raised by the engine and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing required component, out-of-range property, metric cycle,
    /// or an invalid [`AlgorithmConfig`](crate::algorithm::AlgorithmConfig).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A configured component rejected the configuration it was placed in.
    #[error("validation failed for {component}: {message}")]
    Validation { component: String, message: String },

    /// A precondition on an argument was not met.
    #[error("invalid argument `{argument}`: {message}")]
    InvalidArgument {
        argument: &'static str,
        message: String,
    },

    /// The operation is not allowed in the algorithm's current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A pluggable collaborator broke its contract.
    #[error("contract violation by {component}: {message}")]
    ContractViolation { component: String, message: String },

    /// A fitness evaluator failed.
    #[error("fitness evaluation failed: {0}")]
    Evaluation(#[from] anyhow::Error),
}

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn invalid_argument(argument: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            argument,
            message: message.into(),
        }
    }

    pub(crate) fn contract(component: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ContractViolation {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Returns `true` for errors detected while validating a configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::Validation { .. })
    }

    /// Returns `true` for errors caused by calling an operation in the wrong state.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Error::InvalidState(_))
    }
}
