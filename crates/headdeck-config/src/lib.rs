//! Shared configuration for the headdeck binary.
//!
//! TOML profiles, gateway settings, credential resolution (env + keyring +
//! plaintext), and translation to `headdeck_gateway::GatewayConfig` and the
//! client transport settings.

pub mod credentials;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use headdeck_api::{TlsMode, TransportConfig};
use headdeck_gateway::{DEFAULT_UPSTREAM, GatewayConfig};

pub use credentials::{
    KEYRING_SERVICE, KeyringCredentialStore, resolve_credential_store,
};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Settings for `headdeck serve`.
    #[serde(default)]
    pub gateway: GatewaySettings,

    /// Named gateway profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            gateway: GatewaySettings::default(),
            profiles: HashMap::new(),
        }
    }
}

pub const DEFAULT_PROFILE: &str = "default";

impl Config {
    /// Look up a profile by name, falling back to `default_profile`.
    ///
    /// The `default` profile need not exist in the file: a zero-config
    /// install talks to a gateway on localhost.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or(DEFAULT_PROFILE);

        match self.profiles.get(name) {
            Some(profile) => Ok((name.to_owned(), profile.clone())),
            None if name == DEFAULT_PROFILE => Ok((name.to_owned(), Profile::default())),
            None => Err(ConfigError::UnknownProfile { name: name.into() }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// Gateway settings (`[gateway]`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewaySettings {
    /// Socket address to bind.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Upstream base URL; `/api/<rest>` is forwarded to `<upstream>/<rest>`.
    #[serde(default = "default_upstream")]
    pub upstream: String,

    /// Upstream timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Largest request body forwarded.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Accept invalid upstream certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to custom CA certificate for the upstream.
    pub ca_cert: Option<PathBuf>,

    /// Inject the stored credential into requests that carry none.
    #[serde(default)]
    pub inject_credential: bool,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            upstream: default_upstream(),
            timeout: default_timeout(),
            max_body_bytes: default_max_body_bytes(),
            insecure: false,
            ca_cert: None,
            inject_credential: false,
        }
    }
}

fn default_listen() -> String {
    headdeck_gateway::DEFAULT_LISTEN.to_string()
}
fn default_upstream() -> String {
    DEFAULT_UPSTREAM.into()
}
fn default_max_body_bytes() -> usize {
    headdeck_gateway::config::DEFAULT_MAX_BODY_BYTES
}

impl GatewaySettings {
    /// Validate and convert. Called once at startup so a bad upstream is
    /// reported before the listener binds.
    pub fn to_gateway_config(&self) -> Result<GatewayConfig, ConfigError> {
        let upstream = self.upstream.trim();
        if upstream.is_empty() {
            return Err(ConfigError::Validation {
                field: "gateway.upstream".into(),
                reason: "must not be empty".into(),
            });
        }
        let upstream = parse_http_url("gateway.upstream", upstream)?;

        let listen: SocketAddr = self
            .listen
            .trim()
            .parse()
            .map_err(|e| ConfigError::Validation {
                field: "gateway.listen".into(),
                reason: format!("'{}': {e}", self.listen),
            })?;

        if self.max_body_bytes == 0 {
            return Err(ConfigError::Validation {
                field: "gateway.max_body_bytes".into(),
                reason: "must be greater than zero".into(),
            });
        }

        Ok(GatewayConfig::new(upstream)
            .with_listen(listen)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_max_body_bytes(self.max_body_bytes)
            .with_tls(tls_mode(self.insecure, self.ca_cert.as_ref())))
    }
}

/// A named gateway profile: where the client reaches the gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Gateway origin (e.g., "http://127.0.0.1:3000").
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,

    /// API key (plaintext, prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            gateway_url: default_gateway_url(),
            api_key: None,
            api_key_env: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }
}

fn default_gateway_url() -> String {
    "http://127.0.0.1:3000".into()
}

/// Everything a client needs to reach the gateway.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: Url,
    pub transport: TransportConfig,
}

impl Profile {
    pub fn client_settings(&self, defaults: &Defaults) -> Result<ClientSettings, ConfigError> {
        let base_url = parse_http_url("gateway_url", &self.gateway_url)?;
        let transport = TransportConfig::default()
            .with_timeout(Duration::from_secs(self.timeout.unwrap_or(defaults.timeout)))
            .with_tls(tls_mode(
                self.insecure.unwrap_or(false),
                self.ca_cert.as_ref(),
            ));
        Ok(ClientSettings {
            base_url,
            transport,
        })
    }
}

fn tls_mode(insecure: bool, ca_cert: Option<&PathBuf>) -> TlsMode {
    if insecure {
        TlsMode::DangerAcceptInvalid
    } else if let Some(path) = ca_cert {
        TlsMode::CustomCa(path.clone())
    } else {
        TlsMode::System
    }
}

fn parse_http_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("unsupported scheme '{other}', expected http or https"),
        }),
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "headdeck", "headdeck").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("headdeck");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from an explicit file. A missing file yields defaults plus env.
///
/// Env vars use the `HEADDECK_` prefix with `__` between levels, e.g.
/// `HEADDECK_GATEWAY__UPSTREAM`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HEADDECK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parents.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
