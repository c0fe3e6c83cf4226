//! Error types for gateway operations.
//!
//! Every operation returns [`GatewayError`]. Network failures are passed
//! through as [`GatewayError::NetworkError`] unless the contract reverted with
//! a custom error the gateway knows how to classify.

use thiserror::Error;

/// Errors that can occur while talking to the Squiggle contract.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The contract address is still the all-zero sentinel.
    #[error("Contract address not configured: set SQUIGGLE_CONTRACT_ADDRESS to the deployed contract")]
    NotConfigured,
    /// `initialize` was already called on this contract.
    #[error("Contract already initialized")]
    AlreadyInitialized,
    /// Attached value was below the configured mint price.
    #[error("Insufficient payment: {reason}")]
    InsufficientPayment { reason: String },
    /// The signing identity lacks permission for the token.
    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },
    /// The token does not exist.
    #[error("Token {token_id} not found")]
    NotFound { token_id: String },
    /// Malformed address, amount or token URI.
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },
    /// The built-in contract interface is unusable.
    #[error("Contract interface error: {reason}")]
    Interface { reason: String },
    /// Submission, confirmation or read failure.
    #[error("Network error: {reason}")]
    NetworkError { reason: String },
}

impl GatewayError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn network(reason: impl Into<String>) -> Self {
        Self::NetworkError {
            reason: reason.into(),
        }
    }
}

/// Result type alias for gateway operations.
pub type Result<T> = core::result::Result<T, GatewayError>;
