//! CLI configuration: thin wrapper around `headdeck_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides (--gateway,
//! --api-key, --insecure, --timeout, --config).

use std::sync::Arc;
use std::time::Duration;

use headdeck_api::{Credential, CredentialStore, MemoryCredentialStore, TlsMode};
use headdeck_config::ClientSettings;
use headdeck_gateway::GatewayConfig;

use crate::cli::{GlobalOpts, ServeArgs};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use headdeck_config::{Config, Profile, config_path, save_config_to};

// ── Loading ─────────────────────────────────────────────────────────

/// The config file in effect: `--config` or the platform default.
pub fn effective_path(global: &GlobalOpts) -> std::path::PathBuf {
    global.config.clone().unwrap_or_else(config_path)
}

/// Load config from the effective path. A missing file is not an error.
pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(headdeck_config::load_config_from(&effective_path(global))?)
}

/// Resolve the active profile, listing known names when it is missing.
pub fn active_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    config
        .profile(global.profile.as_deref())
        .map_err(|e| match CliError::from(e) {
            CliError::ProfileNotFound { name, .. } => {
                let mut names: Vec<_> = config.profiles.keys().cloned().collect();
                names.sort();
                CliError::ProfileNotFound {
                    name,
                    available: if names.is_empty() {
                        "(none)".into()
                    } else {
                        names.join(", ")
                    },
                }
            }
            other => other,
        })
}

// ── Client side ─────────────────────────────────────────────────────

/// Translate a profile + global flags into client settings.
///
/// CLI flag overrides take priority over profile values.
pub fn client_settings(
    global: &GlobalOpts,
    config: &Config,
    profile: &Profile,
) -> Result<ClientSettings, CliError> {
    let mut profile = profile.clone();
    if let Some(ref url) = global.gateway_url {
        profile.gateway_url.clone_from(url);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if global.timeout.is_some() {
        profile.timeout = global.timeout;
    }
    Ok(profile.client_settings(&config.defaults)?)
}

/// The credential slot for this invocation. `--api-key` wins over the
/// profile's chain.
pub fn credential_store(
    global: &GlobalOpts,
    profile: &Profile,
    profile_name: &str,
) -> Arc<dyn CredentialStore> {
    match global.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        Some(key) => Arc::new(MemoryCredentialStore::with_credential(Credential::new(key))),
        None => headdeck_config::resolve_credential_store(profile, profile_name),
    }
}

// ── Gateway side ────────────────────────────────────────────────────

/// Build the gateway config from `[gateway]` plus `serve` flags.
pub fn gateway_config(
    global: &GlobalOpts,
    config: &Config,
    args: &ServeArgs,
) -> Result<GatewayConfig, CliError> {
    let mut settings = config.gateway.clone();
    if let Some(ref listen) = args.listen {
        settings.listen.clone_from(listen);
    }
    if let Some(ref upstream) = args.upstream {
        settings.upstream.clone_from(upstream);
    }
    let mut gateway = settings.to_gateway_config()?;
    if global.insecure {
        gateway = gateway.with_tls(TlsMode::DangerAcceptInvalid);
    }
    if let Some(secs) = global.timeout {
        gateway = gateway.with_timeout(Duration::from_secs(secs));
    }
    Ok(gateway)
}
