// headdeck-api: Async Rust client for the Headscale management API

pub mod auth;
pub mod client;
pub mod error;
pub mod headers;
pub mod models;
pub mod outcome;
pub mod transport;

pub use auth::{AuthFailure, Credential, CredentialStore, MemoryCredentialStore, Navigator, SETUP_PATH};
pub use client::{ApiClient, RequestOptions};
pub use error::Error;
pub use headers::{AuthorizationSlot, RequestHeaders};
pub use models::{ApiKey, Node, PreAuthKey, Route, User};
pub use outcome::ApiOutcome;
pub use transport::{TlsMode, TransportConfig};
