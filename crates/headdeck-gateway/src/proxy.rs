//! Reverse proxy for `/api/**`
//!
//! Relays method, headers, query and body to the upstream and hands back
//! whatever status, headers and body the upstream produced. The gateway
//! never interprets the payload, so an upstream 401 reaches the client
//! exactly as sent.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, State, rejection::BytesRejection},
    http::{HeaderMap, HeaderName, Method, Uri, header},
    response::Response,
    routing::any,
};
use headdeck_api::{AuthorizationSlot, CredentialStore, TransportConfig};
use tracing::{debug, warn};
use url::Url;

use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// Fixed mount point.
pub const MOUNT: &str = "/api";

/// Hop-by-hop headers (RFC 9110 §7.6.1) are connection-scoped and never
/// forwarded in either direction.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Shared proxy state
pub struct Gateway {
    http: reqwest::Client,
    upstream: Url,
    timeout: Duration,
    max_body_bytes: usize,
    credentials: Option<Arc<dyn CredentialStore>>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("upstream", &self.upstream.as_str())
            .field("timeout", &self.timeout)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("credential_fallback", &self.credentials.is_some())
            .finish_non_exhaustive()
    }
}

impl Gateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let transport = TransportConfig::default()
            .with_timeout(config.timeout)
            .with_tls(config.tls.clone());
        let http = transport
            .builder()?
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(headdeck_api::Error::Transport)?;

        Ok(Self {
            http,
            upstream: config.upstream.clone(),
            timeout: config.timeout,
            max_body_bytes: config.max_body_bytes,
            credentials: None,
        })
    }

    /// Inject `Bearer <credential>` into requests that arrive without an
    /// `Authorization` header. Requests that carry one are left alone.
    pub fn with_credentials(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(store);
        self
    }

    /// Build the router mounting the proxy at `/api` and everything under it.
    pub fn router(self) -> Router {
        let limit = self.max_body_bytes;
        Router::new()
            .route(MOUNT, any(forward))
            .route("/api/", any(forward))
            .route("/api/{*path}", any(forward))
            .layer(DefaultBodyLimit::max(limit))
            .with_state(Arc::new(self))
    }

    /// Upstream URL for an incoming request path and query.
    ///
    /// `/api/v1/node?x=1` against upstream `http://h:8080/api` becomes
    /// `http://h:8080/api/v1/node?x=1`.
    /// Dot segments are rejected, since URL parsing would resolve them
    /// against the upstream base and escape it.
    pub fn target_url(&self, path: &str, query: Option<&str>) -> Result<Url, GatewayError> {
        let rest = path.strip_prefix(MOUNT).unwrap_or(path);
        if has_dot_segment(rest) {
            return Err(GatewayError::PathTraversal(path.to_owned()));
        }
        let base = self.upstream.as_str().trim_end_matches('/');

        let mut target = format!("{base}{rest}");
        if let Some(query) = query {
            target.push('?');
            target.push_str(query);
        }
        Ok(Url::parse(&target)?)
    }

    fn outbound_headers(&self, incoming: &HeaderMap) -> Result<HeaderMap, GatewayError> {
        let mut headers = strip_hop_by_hop(incoming);
        headers.remove(header::HOST);
        headers.remove(header::CONTENT_LENGTH);

        if headers.contains_key(header::AUTHORIZATION) {
            return Ok(headers);
        }
        if let Some(credential) = self.credentials.as_ref().and_then(|s| s.get()) {
            headers.set_authorization(&credential.bearer())?;
        }
        Ok(headers)
    }

    fn upstream_error(&self, e: &reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::UpstreamTimeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            GatewayError::UpstreamUnreachable(e.to_string())
        }
    }
}

async fn forward(
    State(gateway): State<Arc<Gateway>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, GatewayError> {
    let body = body.map_err(|rejection| GatewayError::Body {
        status: rejection.status(),
        message: rejection.body_text(),
    })?;

    let target = gateway.target_url(uri.path(), uri.query())?;
    let outbound = gateway.outbound_headers(&headers)?;
    debug!(%method, %target, bytes = body.len(), "forwarding");

    let upstream = gateway
        .http
        .request(method, target)
        .headers(outbound)
        .body(body)
        .send()
        .await
        .map_err(|e| {
            let err = gateway.upstream_error(&e);
            warn!(error = %e, "upstream request failed");
            err
        })?;

    let status = upstream.status();
    debug!(status = status.as_u16(), "upstream responded");

    let headers = strip_hop_by_hop(upstream.headers());
    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}

/// True if any segment is `.` or `..`, literally or percent-encoded.
/// Backslashes count as separators because `Url` treats them so for http.
fn has_dot_segment(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| {
        let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
        decoded == "." || decoded == ".."
    })
}

/// Copy `headers` minus hop-by-hop ones and anything named in `Connection`.
fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect();

    let mut out = headers.clone();
    for name in HOP_BY_HOP {
        out.remove(name);
    }
    for name in &named {
        out.remove(name);
    }
    out
}
