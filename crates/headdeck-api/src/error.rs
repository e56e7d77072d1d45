use thiserror::Error;

use crate::auth::AuthFailure;

/// Top-level error type for the `headdeck-api` crate.
///
/// Covers every failure mode of the management API client:
/// authentication, transport, HTTP status, payload decoding, and the
/// credential slot. `headdeck-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// No usable credential: either none was stored, or the backend
    /// rejected the one that was sent.
    #[error("Authentication required: {0}")]
    AuthRequired(AuthFailure),

    /// Reading or writing the credential slot failed.
    #[error("Credential store error: {0}")]
    CredentialStore(String),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// A caller-supplied header could not be turned into a valid HTTP header.
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    // ── HTTP ────────────────────────────────────────────────────────
    /// Non-success status other than 401.
    #[error("API error (HTTP {status}): {message}")]
    Status { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::AuthRequired(AuthFailure::Rejected) => Some(401),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
