//! Error types for the wallet ledger

use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the wallet ledger
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    // Input errors
    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    // Remote collaborator errors (chain RPC and indexer)
    #[error("RPC unavailable: {0}")]
    RpcUnavailable(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Check if this error was caused by caller input rather than a remote failure
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::InvalidAddress(_) | Error::InvalidAmount(_) | Error::InvalidUrl(_)
        )
    }
}

// Conversion from solana_client errors
impl From<solana_client::client_error::ClientError> for Error {
    fn from(e: solana_client::client_error::ClientError) -> Self {
        Error::RpcUnavailable(e.to_string())
    }
}

// Conversion from reqwest errors
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::RpcUnavailable(e.to_string())
    }
}

// Conversion from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_classification() {
        assert!(Error::InvalidAddress("x".into()).is_invalid_input());
        assert!(Error::InvalidAmount("-1".into()).is_invalid_input());
        assert!(!Error::RpcUnavailable("down".into()).is_invalid_input());
        assert!(!Error::NotImplemented("spl".into()).is_invalid_input());
    }

    #[test]
    fn test_json_error_maps_to_serialization() {
        let err: Error = serde_json::from_str::<u64>("nope").unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
