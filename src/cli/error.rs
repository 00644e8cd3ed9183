use std::fmt;

use crate::services::access::DownloadDenial;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CliError: unified error hierarchy for all client operations
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug)]
pub enum CliError {
    // Session errors
    LoginRequired { feature: String },
    SessionExpired,
    AuthFailed(String),

    // Authorization errors
    Forbidden(String),
    AccessDenied { reason: DownloadDenial },

    // API errors
    NotFound(String),
    Api { status: u16, message: String },
    Network(String),
    InvalidResponse(String),

    // Local errors
    Validation(String),
    Config(String),
    Io(std::io::Error),
}

impl CliError {
    /// Map a non-success HTTP reply to an error. `detail` is the backend's
    /// `{"detail": ...}` message when one could be extracted.
    pub fn from_status(status: u16, detail: String) -> Self {
        match status {
            401 => Self::SessionExpired,
            403 => Self::Forbidden(detail),
            404 => Self::NotFound(detail),
            _ => Self::Api {
                status,
                message: detail,
            },
        }
    }

    /// True when the stored token should be discarded.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoginRequired { feature } => {
                write!(f, "Login required for {feature}. Run: kantik login")
            }
            Self::SessionExpired => {
                write!(f, "Session expired. Run: kantik login")
            }
            Self::AuthFailed(msg) => {
                write!(f, "Authentication failed: {msg}")
            }
            Self::Forbidden(msg) => {
                if msg.is_empty() {
                    write!(f, "Not allowed")
                } else {
                    write!(f, "Not allowed: {msg}")
                }
            }
            Self::AccessDenied { reason } => {
                write!(f, "Download refused: {reason}")
            }
            Self::NotFound(msg) => {
                if msg.is_empty() {
                    write!(f, "Not found")
                } else {
                    write!(f, "Not found: {msg}")
                }
            }
            Self::Api { status, message } => {
                write!(f, "Server error (HTTP {status}): {message}")
            }
            Self::Network(msg) => {
                write!(f, "Kantik server unreachable: {msg}")
            }
            Self::InvalidResponse(msg) => {
                write!(f, "Invalid response from Kantik server: {msg}")
            }
            Self::Validation(msg) => {
                write!(f, "{msg}")
            }
            Self::Config(msg) => {
                write!(f, "Configuration error: {msg}")
            }
            Self::Io(err) => {
                write!(f, "I/O error: {err}")
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<reqwest::Error> for CliError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse(err.to_string())
    }
}

impl From<base64::DecodeError> for CliError {
    fn from(err: base64::DecodeError) -> Self {
        Self::InvalidResponse(format!("file payload is not valid base64: {err}"))
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(err: dialoguer::Error) -> Self {
        Self::Io(std::io::Error::new(std::io::ErrorKind::Other, err.to_string()))
    }
}

impl From<serde_valid::validation::Errors> for CliError {
    fn from(err: serde_valid::validation::Errors) -> Self {
        Self::Validation(format!("Invalid input: {err}"))
    }
}

impl From<config::ConfigError> for CliError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccessTier, Plan};

    #[test]
    fn test_cli_error_display_login_required() {
        let err = CliError::LoginRequired {
            feature: "playlists".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("playlists"), "Expected feature name in: {msg}");
        assert!(msg.contains("kantik login"), "Expected command hint in: {msg}");
    }

    #[test]
    fn test_status_mapping() {
        assert!(CliError::from_status(401, String::new()).is_session_expired());
        assert!(matches!(
            CliError::from_status(403, "Admin only".into()),
            CliError::Forbidden(m) if m == "Admin only"
        ));
        assert!(matches!(
            CliError::from_status(404, "Song not found".into()),
            CliError::NotFound(_)
        ));
        assert!(matches!(
            CliError::from_status(400, "Team is full".into()),
            CliError::Api { status: 400, .. }
        ));
    }

    #[test]
    fn test_cli_error_display_api_error_keeps_detail() {
        let err = CliError::from_status(400, "Team is full (max 7 members)".into());
        let msg = format!("{err}");
        assert!(msg.contains("400"), "Expected status in: {msg}");
        assert!(msg.contains("Team is full"), "Expected detail in: {msg}");
    }

    #[test]
    fn test_cli_error_display_access_denied() {
        let err = CliError::AccessDenied {
            reason: DownloadDenial::TierTooLow {
                plan: Plan::Standard,
                tier: AccessTier::Premium,
            },
        };
        let msg = format!("{err}");
        assert!(msg.contains("PREMIUM"), "Expected tier in: {msg}");
        assert!(msg.contains("STANDARD"), "Expected plan in: {msg}");
    }

    #[test]
    fn test_cli_error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let cli_err = CliError::from(io_err);
        assert!(matches!(cli_err, CliError::Io(_)), "Expected CliError::Io variant");
    }

    #[test]
    fn test_cli_error_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(
            CliError::from(json_err),
            CliError::InvalidResponse(_)
        ));
    }
}
