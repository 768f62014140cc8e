//! Error types and handling for the ADS-B tracker

use serde::Serialize;
use thiserror::Error;

/// Category of a failure, as reported to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    ProviderUnavailable,
    ProviderAuth,
    InvalidResponse,
    Configuration,
    Agent,
    Internal,
}

impl ErrorKind {
    /// HTTP status code used when this kind reaches the API boundary
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::InvalidArgument => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::ProviderUnavailable | ErrorKind::ProviderAuth | ErrorKind::InvalidResponse => 502,
            ErrorKind::Configuration | ErrorKind::Agent | ErrorKind::Internal => 500,
        }
    }
}

/// Main error type for the ADS-B tracker
#[derive(Error, Debug)]
pub enum AdsbError {
    /// Malformed or out-of-range input
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The provider answered but has no data for the query
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// The provider could not be reached or failed after retries
    #[error("Provider unavailable: {message}")]
    ProviderUnavailable { message: String },

    /// The provider rejected our credentials
    #[error("Provider authentication failed: {message}")]
    ProviderAuth { message: String },

    /// The provider answered with a body we could not decode
    #[error("Invalid provider response: {message}")]
    InvalidResponse { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Language model or tool dispatch failure
    #[error("Agent error: {message}")]
    Agent { message: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl AdsbError {
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn provider_unavailable<S: Into<String>>(message: S) -> Self {
        Self::ProviderUnavailable {
            message: message.into(),
        }
    }

    pub fn provider_auth<S: Into<String>>(message: S) -> Self {
        Self::ProviderAuth {
            message: message.into(),
        }
    }

    pub fn invalid_response<S: Into<String>>(message: S) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn agent<S: Into<String>>(message: S) -> Self {
        Self::Agent {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            AdsbError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            AdsbError::NotFound { .. } => ErrorKind::NotFound,
            AdsbError::ProviderUnavailable { .. } => ErrorKind::ProviderUnavailable,
            AdsbError::ProviderAuth { .. } => ErrorKind::ProviderAuth,
            AdsbError::InvalidResponse { .. } => ErrorKind::InvalidResponse,
            AdsbError::Config { .. } => ErrorKind::Configuration,
            AdsbError::Agent { .. } => ErrorKind::Agent,
            AdsbError::Io { .. } => ErrorKind::Internal,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AdsbError::InvalidArgument { message } | AdsbError::NotFound { message } => {
                message.clone()
            }
            AdsbError::ProviderUnavailable { .. } => {
                "The flight-tracking provider is unreachable. Please try again later.".to_string()
            }
            AdsbError::ProviderAuth { .. } => {
                "The flight-tracking provider rejected the configured credentials.".to_string()
            }
            AdsbError::InvalidResponse { .. } => {
                "The flight-tracking provider returned data that could not be read.".to_string()
            }
            AdsbError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            AdsbError::Agent { message } => format!("Assistant failure: {message}"),
            AdsbError::Io { .. } => "An internal I/O error occurred.".to_string(),
        }
    }
}
