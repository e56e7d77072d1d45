// headdeck-gateway: Same-origin reverse proxy in front of the Headscale API.

pub mod config;
pub mod error;
pub mod proxy;
pub mod server;

pub use config::{DEFAULT_LISTEN, DEFAULT_UPSTREAM, GatewayConfig};
pub use error::{ErrorResponse, GatewayError};
pub use proxy::{Gateway, MOUNT};
pub use server::{serve, shutdown_on_signal};
