//! Configuration types for the Cambist SDK.

use std::time::Duration;
use url::Url;

/// Configuration for the Cambist client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Cambist server.
    pub base_url: Url,
    /// Bound on the handshake and on each request/response exchange.
    pub timeout: Duration,
    /// Name reported in the initialize handshake.
    pub client_name: String,
    /// Version reported in the initialize handshake.
    pub client_version: String,
}

impl ClientConfig {
    /// Create a new configuration with the given base URL.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(30),
            client_name: "cambist-sdk".to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = ClientConfig::new(Url::parse("http://localhost:8081").unwrap());

        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.client_name, "cambist-sdk");
        assert!(!config.client_version.is_empty());
    }
}
