//! Gateway errors
//!
//! Every failure the gateway itself produces is rendered as JSON. None of
//! them use 401, so a client can always tell a gateway failure from an
//! upstream authentication rejection.

use std::net::SocketAddr;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Upstream did not answer within {timeout_secs}s")]
    UpstreamTimeout { timeout_secs: u64 },

    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("Invalid target URL: {0}")]
    InvalidTarget(#[from] url::ParseError),

    #[error("Path escapes the upstream base: {0}")]
    PathTraversal(String),

    #[error("{message}")]
    Body { status: StatusCode, message: String },

    #[error("HTTP client setup failed: {0}")]
    Client(#[from] headdeck_api::Error),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Error response format
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::UpstreamUnreachable(_) | GatewayError::InvalidTarget(_) => {
                StatusCode::BAD_GATEWAY
            }
            GatewayError::PathTraversal(_) => StatusCode::BAD_REQUEST,
            GatewayError::Body { status, .. } => *status,
            GatewayError::Client(_) | GatewayError::Bind { .. } | GatewayError::Serve(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_are_never_unauthorized() {
        let errors = [
            GatewayError::UpstreamTimeout { timeout_secs: 1 },
            GatewayError::UpstreamUnreachable("refused".into()),
            GatewayError::Body {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                message: "too big".into(),
            },
        ];
        let statuses: Vec<_> = errors.iter().map(GatewayError::status).collect();
        assert_eq!(
            statuses,
            vec![
                StatusCode::GATEWAY_TIMEOUT,
                StatusCode::BAD_GATEWAY,
                StatusCode::PAYLOAD_TOO_LARGE
            ]
        );
    }
}
