// ── Core error types ──
//
// User-facing errors from headdeck-core. Consumers never see reqwest or
// JSON parse failures directly; the `From<headdeck_api::Error>` impl
// translates transport-layer errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the management API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication required: {reason}")]
    AuthenticationRequired { reason: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<headdeck_api::Error> for CoreError {
    fn from(err: headdeck_api::Error) -> Self {
        match err {
            headdeck_api::Error::AuthRequired(why) => CoreError::AuthenticationRequired {
                reason: why.to_string(),
            },
            headdeck_api::Error::CredentialStore(message) => CoreError::Config {
                message: format!("credential store: {message}"),
            },
            headdeck_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            headdeck_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            headdeck_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            headdeck_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            headdeck_api::Error::InvalidHeader { name, reason } => {
                CoreError::Internal(format!("invalid header '{name}': {reason}"))
            }
            headdeck_api::Error::Status { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            headdeck_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
