//! Error taxonomy for suite execution
//!
//! Only configuration and connectivity errors abort a run. Module-level
//! errors are folded into failed `ModuleResult`s by the execution wrapper.

use thiserror::Error;

/// Suite orchestration errors
#[derive(Error, Debug)]
pub enum SuiteError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("{message}")]
    ModuleExecution { module: String, message: String },

    #[error("{module} test timed out ({timeout_ms}ms)")]
    ModuleTimeout { module: String, timeout_ms: u64 },

    #[error("Cleanup error: {0}")]
    Cleanup(String),
}

impl SuiteError {
    pub fn configuration(message: impl Into<String>) -> Self {
        SuiteError::Configuration(message.into())
    }

    pub fn connection(message: impl Into<String>) -> Self {
        SuiteError::Connection(message.into())
    }
}

/// Result type for suite orchestration
pub type Result<T> = std::result::Result<T, SuiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        let err = SuiteError::ModuleTimeout {
            module: "chatbot".to_string(),
            timeout_ms: 50,
        };
        assert_eq!(err.to_string(), "chatbot test timed out (50ms)");
    }

    #[test]
    fn test_execution_message_is_raw() {
        let err = SuiteError::ModuleExecution {
            module: "security".to_string(),
            message: "scanner unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "scanner unavailable");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            SuiteError::configuration("bad mode").to_string(),
            "Configuration error: bad mode"
        );
        assert_eq!(
            SuiteError::Cleanup("disconnect failed".into()).to_string(),
            "Cleanup error: disconnect failed"
        );
    }
}
