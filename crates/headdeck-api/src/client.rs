// Authenticated API client
//
// The single choke point for outbound calls. Every request goes through
// a pre-request hook (credential lookup + bearer injection) and a
// post-response hook (401 handling). Both hooks send the user to the
// setup flow through the injected `Navigator`; neither retries nor
// touches the credential slot.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::{AuthFailure, CredentialStore, Navigator, SETUP_PATH};
use crate::error::Error;
use crate::headers::{AuthorizationSlot, RequestHeaders};
use crate::models::{
    ApiKey, ApiKeysResponse, Node, NodesResponse, Route, RoutesResponse, User, UsersResponse,
};
use crate::outcome::ApiOutcome;
use crate::transport::TransportConfig;

const BODY_PREVIEW_CHARS: usize = 200;

/// Per-request knobs. Defaults to a bare `GET`.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Option<RequestHeaders>,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl RequestOptions {
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_headers(mut self, headers: impl Into<RequestHeaders>) -> Self {
        self.headers = Some(headers.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Async client for the management API, as seen through the gateway.
///
/// `base_url` is the origin serving `/api/*` (normally the gateway).
/// Cheap to clone; clones share the HTTP pool, credential slot and
/// navigator.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
    credentials: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    pub fn new(
        base_url: Url,
        credentials: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout_secs: transport.timeout.as_secs(),
            credentials,
            navigator,
        })
    }

    /// Wrap an existing `reqwest::Client`. `timeout` should match the one
    /// the client was built with; it is only used in error reports.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        credentials: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            base_url,
            timeout_secs: timeout.as_secs(),
            credentials,
            navigator,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    // ── Resource endpoints ───────────────────────────────────────────

    /// `GET /api/v1/apikey`
    pub async fn list_api_keys(&self) -> ApiOutcome<Vec<ApiKey>> {
        self.get::<ApiKeysResponse>("/api/v1/apikey")
            .await
            .map(|r| r.api_keys)
    }

    /// `GET /api/v1/node`
    pub async fn list_nodes(&self) -> ApiOutcome<Vec<Node>> {
        self.get::<NodesResponse>("/api/v1/node")
            .await
            .map(|r| r.nodes)
    }

    /// `GET /api/v1/routes`
    pub async fn list_routes(&self) -> ApiOutcome<Vec<Route>> {
        self.get::<RoutesResponse>("/api/v1/routes")
            .await
            .map(|r| r.routes)
    }

    /// `GET /api/v1/user`
    pub async fn list_users(&self) -> ApiOutcome<Vec<User>> {
        self.get::<UsersResponse>("/api/v1/user")
            .await
            .map(|r| r.users)
    }

    // ── Generic requests ─────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiOutcome<T> {
        self.request(path, RequestOptions::default()).await
    }

    /// Send an authenticated request and decode the JSON response.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        mut options: RequestOptions,
    ) -> ApiOutcome<T> {
        // Pre-request hook: no credential means no network call at all.
        let Some(credential) = self.credentials.get() else {
            debug!(path, "no credential stored, redirecting to setup");
            self.navigator.replace(SETUP_PATH);
            return ApiOutcome::AuthRequired(AuthFailure::MissingCredential);
        };

        let mut headers = options.headers.take().unwrap_or_default();
        if let Err(e) = headers.set_authorization(&credential.bearer()) {
            return ApiOutcome::Failed(e);
        }

        let resp = match self.send(path, options, headers).await {
            Ok(resp) => resp,
            Err(e) => return ApiOutcome::Failed(e),
        };

        self.handle_response(resp).await
    }

    // ── Internals ────────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    async fn send(
        &self,
        path: &str,
        options: RequestOptions,
        headers: RequestHeaders,
    ) -> Result<reqwest::Response, Error> {
        let url = self.url(path)?;
        debug!("{} {}", options.method, url);

        let mut builder = self
            .http
            .request(options.method, url)
            .headers(headers.into_header_map()?);
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(ref body) = options.body {
            builder = builder.json(body);
        }

        builder.send().await.map_err(|e| self.transport_error(e))
    }

    /// Post-response hook plus JSON decoding.
    async fn handle_response<T: DeserializeOwned>(&self, resp: reqwest::Response) -> ApiOutcome<T> {
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED {
            debug!(url = %resp.url(), "credential rejected, redirecting to setup");
            self.navigator.replace(SETUP_PATH);
            return ApiOutcome::AuthRequired(AuthFailure::Rejected);
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return ApiOutcome::Failed(Error::Status {
                status: status.as_u16(),
                message: preview(&body),
            });
        }

        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => return ApiOutcome::Failed(self.transport_error(e)),
        };
        trace!(bytes = body.len(), "response body received");

        match serde_json::from_str(&body) {
            Ok(value) => ApiOutcome::Ok(value),
            Err(e) => ApiOutcome::Failed(Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body,
            }),
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(e)
        }
    }
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
