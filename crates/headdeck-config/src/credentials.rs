// ── Credential resolution ──
//
// The persisted credential slot lives in the system keyring. Env vars and
// plaintext config keys are read-only sources that seed an in-memory slot.

use std::sync::Arc;

use headdeck_api::{Credential, CredentialStore, MemoryCredentialStore};
use secrecy::SecretString;
use tracing::debug;

use crate::Profile;

/// Keyring service name.
pub const KEYRING_SERVICE: &str = "headdeck";

/// Keyring-backed credential slot for one profile (`<profile>/api-key`).
#[derive(Debug, Clone)]
pub struct KeyringCredentialStore {
    account: String,
}

impl KeyringCredentialStore {
    pub fn new(profile_name: &str) -> Self {
        Self {
            account: format!("{profile_name}/api-key"),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    fn entry(&self) -> Result<keyring::Entry, keyring::Error> {
        keyring::Entry::new(KEYRING_SERVICE, &self.account)
    }

    /// Remove the stored key. A missing entry is not an error.
    pub fn clear(&self) -> Result<(), headdeck_api::Error> {
        match self.entry().and_then(|e| e.delete_credential()) {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(headdeck_api::Error::CredentialStore(e.to_string())),
        }
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn get(&self) -> Option<Credential> {
        let secret = self.entry().and_then(|e| e.get_password()).ok()?;
        let credential = Credential::new(secret);
        (!credential.is_empty()).then_some(credential)
    }

    fn set(&self, credential: Credential) -> Result<(), headdeck_api::Error> {
        self.entry()
            .and_then(|e| e.set_password(credential.expose()))
            .map_err(|e| headdeck_api::Error::CredentialStore(e.to_string()))?;
        debug!(account = %self.account, "stored credential in keyring");
        Ok(())
    }
}

fn plaintext_api_key(profile: &Profile) -> Option<SecretString> {
    profile
        .api_key
        .as_ref()
        .filter(|k| !k.trim().is_empty())
        .map(|k| SecretString::from(k.clone()))
}

fn env_api_key(profile: &Profile) -> Option<String> {
    let name = profile.api_key_env.as_deref()?;
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// The credential slot a client for this profile should use.
///
/// 1. the env var named by `api_key_env`
/// 2. the system keyring
/// 3. plaintext `api_key` in the config file
///
/// Env var and plaintext keys are served from a seeded in-memory slot.
/// Otherwise the keyring slot itself is returned, empty or not, so that
/// absence reaches the client and triggers the setup redirect.
pub fn resolve_credential_store(profile: &Profile, profile_name: &str) -> Arc<dyn CredentialStore> {
    resolve_with(profile, profile_name, KeyringCredentialStore::new(profile_name))
}

fn resolve_with<K>(profile: &Profile, profile_name: &str, keyring: K) -> Arc<dyn CredentialStore>
where
    K: CredentialStore + 'static,
{
    if let Some(val) = env_api_key(profile) {
        debug!(profile = profile_name, "using credential from environment");
        return seeded(SecretString::from(val));
    }

    if keyring.get().is_some() {
        debug!(profile = profile_name, "using keyring credential slot");
        return Arc::new(keyring);
    }

    if let Some(secret) = plaintext_api_key(profile) {
        debug!(profile = profile_name, "using plaintext credential from config file");
        return seeded(secret);
    }

    debug!(profile = profile_name, "no credential stored yet");
    Arc::new(keyring)
}

fn seeded(secret: SecretString) -> Arc<dyn CredentialStore> {
    Arc::new(MemoryCredentialStore::with_credential(Credential::from(
        secret,
    )))
}
