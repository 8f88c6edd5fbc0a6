//! Error types for Toon client operations

use serde_json::Value;
use thiserror::Error;

/// Result type alias for Toon client operations
pub type Result<T> = std::result::Result<T, ToonError>;

/// Errors that can occur during Toon client operations
///
/// `Connection`, `Timeout` and `RateLimited` mean "try again later" and are
/// retried before they reach the caller. Everything else points at the
/// request, the account or the caller.
#[derive(Error, Debug)]
pub enum ToonError {
    /// Transport failure while talking to the API
    #[error("Error occurred while communicating with the Toon API: {0}")]
    Connection(#[source] reqwest::Error),

    /// No complete response within the request timeout
    #[error("Timeout occurred while connecting to the Toon API")]
    Timeout,

    /// HTTP 429
    #[error("Rate limit error has occurred with the Toon API")]
    RateLimited,

    /// Any other 4xx/5xx response
    #[error("Toon API returned HTTP {status}: {body}")]
    Api { status: u16, body: Value },

    /// The linked account has no agreements
    #[error("No agreements found on linked account")]
    NoAgreements,

    /// No agreement matched the selector
    #[error("Agreement could not be found on the linked account")]
    AgreementNotFound,

    /// Operation needs an activated agreement
    #[error("No agreement has been activated")]
    NoActiveAgreement,

    /// The token provider failed
    #[error("Failed to refresh access token: {0}")]
    TokenRefresh(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A header value could not be encoded
    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl ToonError {
    /// Create an API error from status code and body
    pub fn api(status: u16, body: Value) -> Self {
        Self::Api { status, body }
    }

    /// Transport-level failure, including timeouts and rate limiting
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            ToonError::Connection(_) | ToonError::Timeout | ToonError::RateLimited
        )
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ToonError::RateLimited)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ToonError::Timeout)
    }

    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ToonError::Api { status, .. } => Some(*status),
            ToonError::RateLimited => Some(429),
            ToonError::Connection(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ToonError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ToonError::Timeout
        } else {
            ToonError::Connection(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classification() {
        assert!(ToonError::Timeout.is_connection_error());
        assert!(ToonError::Timeout.is_timeout());
        assert!(ToonError::RateLimited.is_connection_error());
        assert!(ToonError::RateLimited.is_rate_limit());
        assert!(!ToonError::NoAgreements.is_connection_error());
        assert!(!ToonError::api(500, json!({})).is_connection_error());
        assert!(!ToonError::AgreementNotFound.is_rate_limit());
    }

    #[test]
    fn test_status() {
        assert_eq!(ToonError::api(404, json!({})).status(), Some(404));
        assert_eq!(ToonError::RateLimited.status(), Some(429));
        assert_eq!(ToonError::NoActiveAgreement.status(), None);
    }

    #[test]
    fn test_display() {
        let err = ToonError::api(500, json!({"message": "boom"}));
        assert_eq!(err.to_string(), r#"Toon API returned HTTP 500: {"message":"boom"}"#);
        assert_eq!(
            ToonError::NoAgreements.to_string(),
            "No agreements found on linked account"
        );
    }
}
