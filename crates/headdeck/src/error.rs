//! CLI error types with miette diagnostics.
//!
//! Maps core, config and gateway errors into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use headdeck_config::ConfigError;
use headdeck_core::{CoreError, FetchError};
use headdeck_gateway::GatewayError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Authentication ───────────────────────────────────────────────
    #[error("No valid API key for profile '{profile}'")]
    #[diagnostic(
        code(headdeck::setup_required),
        help(
            "Store a key with: headdeck setup --profile {profile}\n\
             Create one on the server with: headscale apikeys create"
        )
    )]
    SetupRequired { profile: String },

    #[error("The server rejected the API key for profile '{profile}'")]
    #[diagnostic(
        code(headdeck::auth_rejected),
        help("The key was saved. Check that it has not expired, then run setup again.")
    )]
    AuthRejected { profile: String },

    #[error("Authentication required: {reason}")]
    #[diagnostic(
        code(headdeck::auth_required),
        help("Store a key for the profile in use with: headdeck setup")
    )]
    AuthRequired { reason: String },

    #[error("Could not store the API key: {message}")]
    #[diagnostic(
        code(headdeck::credential_store),
        help("No system keyring available? Set api_key_env in the profile instead.")
    )]
    CredentialStore { message: String },

    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the gateway at {url}")]
    #[diagnostic(
        code(headdeck::connection_failed),
        help(
            "Check that `headdeck serve` is running and reachable.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(headdeck::timeout),
        help("Increase timeout with --timeout or check server responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── API ──────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(headdeck::api_error))]
    ApiError { status: Option<u16>, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(headdeck::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(headdeck::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(headdeck::config))]
    Config(Box<ConfigError>),

    // ── Gateway ──────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(headdeck::gateway))]
    Gateway(#[from] GatewayError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(headdeck::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::SetupRequired { .. } | Self::AuthRejected { .. } | Self::AuthRequired { .. } => {
                exit_code::AUTH
            }
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: String::new(),
            },
            other => CliError::Config(Box::new(other)),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::AuthenticationRequired { reason } => CliError::AuthRequired { reason },
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::Api { message, status } => CliError::ApiError { status, message },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => CliError::ApiError {
                status: None,
                message,
            },
        }
    }
}

impl From<headdeck_api::Error> for CliError {
    fn from(err: headdeck_api::Error) -> Self {
        match err {
            headdeck_api::Error::CredentialStore(message) => CliError::CredentialStore { message },
            other => CoreError::from(other).into(),
        }
    }
}

impl From<FetchError> for CliError {
    fn from(err: FetchError) -> Self {
        CliError::ApiError {
            status: err.status,
            message: err.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_required_exits_with_auth_code() {
        let err = CliError::SetupRequired {
            profile: "default".into(),
        };
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn config_validation_is_a_usage_error() {
        let err: CliError = ConfigError::Validation {
            field: "gateway.upstream".into(),
            reason: "must not be empty".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn core_auth_error_names_no_profile() {
        let err: CliError = CoreError::AuthenticationRequired {
            reason: "no API key stored".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::AUTH);
        let help = err.help().unwrap().to_string();
        assert!(help.contains("headdeck setup"));
        assert!(!help.contains("--profile"));
    }

    #[test]
    fn fetch_error_keeps_status() {
        let err: CliError = FetchError {
            message: "boom".into(),
            status: Some(500),
        }
        .into();
        assert!(matches!(err, CliError::ApiError { status: Some(500), .. }));
    }
}
