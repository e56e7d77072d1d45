//! Gateway configuration

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use headdeck_api::TlsMode;
use url::Url;

/// Loopback on port 3000.
pub const DEFAULT_LISTEN: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 3000));

/// Where a stock Headscale serves its API.
pub const DEFAULT_UPSTREAM: &str = "http://localhost:8080/api";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// 10 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Gateway server configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket the gateway binds to.
    pub listen: SocketAddr,
    /// Base URL that `/api/<rest>` is appended to (as `<upstream>/<rest>`).
    pub upstream: Url,
    /// Bound on each upstream exchange.
    pub timeout: Duration,
    /// Largest request body forwarded; bigger bodies get 413.
    pub max_body_bytes: usize,
    pub tls: TlsMode,
}

impl GatewayConfig {
    pub fn new(upstream: Url) -> Self {
        Self {
            listen: DEFAULT_LISTEN,
            upstream,
            timeout: DEFAULT_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            tls: TlsMode::System,
        }
    }

    pub fn with_listen(mut self, listen: SocketAddr) -> Self {
        self.listen = listen;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn with_tls(mut self, tls: TlsMode) -> Self {
        self.tls = tls;
        self
    }

    pub fn is_localhost(&self) -> bool {
        self.listen.ip().is_loopback()
    }
}
