//! Chain client errors

use thiserror::Error;

/// Errors raised by execution targets
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChainError {
    #[error("Failed to connect to {0}")]
    Connect(String),

    #[error("Failed to release {0}")]
    Release(String),

    #[error("{method} failed: {message}")]
    Rpc { method: String, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Client already closed")]
    Closed,
}

impl ChainError {
    pub fn rpc(method: impl Into<String>, message: impl Into<String>) -> Self {
        ChainError::Rpc {
            method: method.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ChainError::rpc("get_quote", "execution reverted");
        assert_eq!(err.to_string(), "get_quote failed: execution reverted");

        let err = ChainError::Connect("http://127.0.0.1:4444".to_string());
        assert_eq!(err.to_string(), "Failed to connect to http://127.0.0.1:4444");
    }
}
