use std::fmt;
use std::sync::{PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Where every authentication failure sends the user.
pub const SETUP_PATH: &str = "/setup";

/// Opaque bearer token authorizing calls to the management API.
///
/// The token is held as a [`SecretString`] so it never shows up in
/// `Debug` output or logs.
#[derive(Debug, Clone)]
pub struct Credential(SecretString);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The `Authorization` header value: `Bearer <token>`.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0.expose_secret())
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().trim().is_empty()
    }
}

impl From<SecretString> for Credential {
    fn from(secret: SecretString) -> Self {
        Self(secret)
    }
}

/// Why a request ended in the credential-setup flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// No credential was stored; nothing was sent.
    MissingCredential,
    /// The backend answered 401.
    Rejected,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCredential => f.write_str("no API key configured"),
            Self::Rejected => f.write_str("API key rejected by the server"),
        }
    }
}

/// The single process-wide credential slot.
///
/// One writer (the setup flow), many readers (every outbound request).
/// Readers never mutate it; a 401 does not clear it.
pub trait CredentialStore: Send + Sync {
    /// The current credential. Absence is a valid state.
    fn get(&self) -> Option<Credential>;

    /// Replace the stored credential.
    fn set(&self, credential: Credential) -> Result<(), Error>;
}

/// In-process credential slot.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: RwLock<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            slot: RwLock::new(Some(credential)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Option<Credential> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|c| !c.is_empty())
    }

    fn set(&self, credential: Credential) -> Result<(), Error> {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(credential);
        Ok(())
    }
}

/// Redirect sink for authentication failures.
///
/// `replace` swaps the current location without leaving a history entry,
/// so going back never lands on the failed attempt.
pub trait Navigator: Send + Sync {
    fn replace(&self, path: &str);
}
