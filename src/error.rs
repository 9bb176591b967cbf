//! Error types.
//!
//! Two layers:
//!
//! - [`EngineError`]: typed failures raised by the estimation core (bad query
//!   input, unusable dataset or model). Callers can match on these.
//! - [`AppError`]: the binary-boundary error carrying a process exit code.

/// Exit code for invalid user input (query fields, CLI files).
pub const EXIT_INPUT: u8 = 2;
/// Exit code for configuration / dataset problems that prevent startup.
pub const EXIT_CONFIG: u8 = 3;
/// Exit code for runtime failures (terminal, rendering, I/O).
pub const EXIT_RUNTIME: u8 = 4;

/// Failures raised by the estimation core.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// A query field is missing or malformed. Recoverable: re-prompt the user.
    #[error("invalid input `{field}`: {reason}")]
    Validation { field: String, reason: String },

    /// The dataset or model cannot support estimation. Fatal at startup.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl EngineError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Validation { .. } => EXIT_INPUT,
            Self::Configuration(_) => EXIT_CONFIG,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(EXIT_INPUT, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(EXIT_RUNTIME, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        Self::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_to_exit_codes() {
        let v: AppError = EngineError::validation("bedrooms", "not a number").into();
        assert_eq!(v.exit_code(), EXIT_INPUT);
        assert_eq!(v.message(), "invalid input `bedrooms`: not a number");

        let c: AppError = EngineError::configuration("dataset is empty").into();
        assert_eq!(c.exit_code(), EXIT_CONFIG);
        assert!(c.to_string().contains("dataset is empty"));
    }
}
