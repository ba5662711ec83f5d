use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Result type alias for silence operations
pub type Result<T> = std::result::Result<T, SilenceCtlError>;

/// Errors that can occur while building or sending silence requests
#[derive(Debug, Error)]
pub enum SilenceCtlError {
    /// Failed to build HTTP client
    #[error("Failed to build HTTP client: {0}")]
    BuildHttpClient(#[source] reqwest::Error),

    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest_middleware::Error),

    /// Response body could not be read or decoded
    #[error("Failed to read Alertmanager response: {0}")]
    Response(#[source] reqwest::Error),

    /// Failed to serialize the silence payload
    #[error("Failed to serialize silence: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Alertmanager API returned an error response
    #[error("Alertmanager API error: HTTP {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from Alertmanager
        message: String,
    },

    /// A label flag was given but neither the command line nor the config supplied a value
    #[error("--{label} was requested but no value provided (and no config default)")]
    MissingMatcherValue {
        /// Label name of the flag
        label: &'static str,
    },

    /// No explicit matcher was given and the host FQDN is unknown
    #[error("No matchers provided and FQDN is empty/unknown")]
    UnresolvedFqdn,

    /// The silence would end past the latest representable time
    #[error("Silence duration {0} is out of range")]
    InvalidDuration(chrono::Duration),
}

/// Broad category of a [`SilenceCtlError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad or missing input, detected before any request is sent
    Configuration,
    /// Connection failure, timeout or unreadable response
    Transport,
    /// Alertmanager rejected the request
    Backend,
}

impl Display for ErrorClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorClass::Configuration => write!(f, "configuration"),
            ErrorClass::Transport => write!(f, "transport"),
            ErrorClass::Backend => write!(f, "backend"),
        }
    }
}

impl SilenceCtlError {
    /// Classify the error
    ///
    /// Configuration errors are raised before the network is touched,
    /// the other two classes come from an actual request.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::MissingMatcherValue { .. } | Self::UnresolvedFqdn | Self::InvalidDuration(_) => {
                ErrorClass::Configuration
            }
            // Request body encoding belongs to the wire exchange
            Self::BuildHttpClient(_) | Self::Request(_) | Self::Response(_) | Self::Serialize(_) => {
                ErrorClass::Transport
            }
            Self::Api { .. } => ErrorClass::Backend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_is_backend() {
        let error = SilenceCtlError::Api {
            status: 500,
            message: "Internal server error".to_string(),
        };
        assert_eq!(error.class(), ErrorClass::Backend);

        let error = SilenceCtlError::Api {
            status: 400,
            message: "Bad request".to_string(),
        };
        assert_eq!(error.class(), ErrorClass::Backend);
    }

    #[test]
    fn test_matcher_errors_are_configuration() {
        let error = SilenceCtlError::MissingMatcherValue { label: "role" };
        assert_eq!(error.class(), ErrorClass::Configuration);
        assert_eq!(error.class().to_string(), "configuration");

        assert_eq!(
            SilenceCtlError::UnresolvedFqdn.class(),
            ErrorClass::Configuration
        );
    }

    #[test]
    fn test_error_display() {
        let error = SilenceCtlError::Api {
            status: 500,
            message: "Internal server error".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Alertmanager API error: HTTP 500 - Internal server error"
        );

        let error = SilenceCtlError::MissingMatcherValue { label: "group" };
        assert_eq!(
            error.to_string(),
            "--group was requested but no value provided (and no config default)"
        );
    }

    #[test]
    fn test_serialize_error_is_transport() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let error = SilenceCtlError::Serialize(json_err);
        assert_eq!(error.class(), ErrorClass::Transport);
    }

    #[test]
    fn test_invalid_duration_is_configuration() {
        let error = SilenceCtlError::InvalidDuration(chrono::Duration::hours(1));
        assert_eq!(error.class(), ErrorClass::Configuration);
    }
}
