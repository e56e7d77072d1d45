//! Response types for the Headscale management API (`/api/v1/`).
//!
//! Field names follow the server's camelCase JSON. Identifiers are strings
//! because the server encodes 64-bit ids as JSON strings. Timestamps the
//! server may omit or null out are `Option`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── API keys ─────────────────────────────────────────────────────────

/// API key metadata, from `GET /api/v1/apikey`. The secret itself is
/// never returned, only its prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub id: String,
    pub prefix: String,
    #[serde(default)]
    pub expiration: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
}

// ── Users ────────────────────────────────────────────────────────────

/// A user (namespace), from `GET /api/v1/user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// ── Pre-auth keys ────────────────────────────────────────────────────

/// Pre-authentication key, embedded by value in [`Node`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreAuthKey {
    /// Owning user's name.
    #[serde(default)]
    pub user: String,
    pub id: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub reusable: bool,
    #[serde(default)]
    pub ephemeral: bool,
    #[serde(default)]
    pub used: bool,
    #[serde(default)]
    pub expiration: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub acl_tags: Vec<String>,
}

// ── Nodes ────────────────────────────────────────────────────────────

/// A registered machine, from `GET /api/v1/node`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    #[serde(default)]
    pub machine_key: String,
    #[serde(default)]
    pub node_key: String,
    #[serde(default)]
    pub disco_key: String,
    #[serde(default)]
    pub ip_addresses: Vec<String>,
    pub name: String,
    pub user: User,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
    /// Absent for nodes registered interactively rather than with a key.
    #[serde(default)]
    pub pre_auth_key: Option<PreAuthKey>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub register_method: String,
    #[serde(default)]
    pub forced_tags: Vec<String>,
    #[serde(default)]
    pub invalid_tags: Vec<String>,
    #[serde(default)]
    pub valid_tags: Vec<String>,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub online: bool,
}

impl Node {
    /// The operator-facing name: `givenName` when set, `name` otherwise.
    pub fn display_name(&self) -> &str {
        if self.given_name.is_empty() {
            &self.name
        } else {
            &self.given_name
        }
    }
}

// ── Routes ───────────────────────────────────────────────────────────

/// A subnet or exit route advertised by a node, from `GET /api/v1/routes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub node: Node,
    pub prefix: String,
    #[serde(default)]
    pub advertised: bool,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

// ── List envelopes ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeysResponse {
    #[serde(default)]
    pub api_keys: Vec<ApiKey>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodesResponse {
    #[serde(default)]
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutesResponse {
    #[serde(default)]
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsersResponse {
    #[serde(default)]
    pub users: Vec<User>,
}
