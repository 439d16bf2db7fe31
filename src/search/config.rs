//! Typesense connection configuration

use serde::{Deserialize, Serialize};

/// Typesense node and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypesenseConfig {
    /// Node host name
    #[serde(default = "default_host")]
    pub host: String,

    /// Node port
    #[serde(default = "default_port")]
    pub port: u16,

    /// `http` or `https`
    #[serde(default = "default_protocol")]
    pub protocol: String,

    /// Admin API key sent as `X-TYPESENSE-API-KEY`
    #[serde(default)]
    pub api_key: String,

    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,
}

impl TypesenseConfig {
    /// Base URL of the node, without a trailing slash
    pub fn base_url(&self) -> String {
        format!(
            "{}://{}:{}",
            self.protocol,
            self.host.trim_end_matches('/'),
            self.port
        )
    }
}

impl Default for TypesenseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            protocol: default_protocol(),
            api_key: String::new(),
            connection_timeout_secs: default_connection_timeout(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8108
}

fn default_protocol() -> String {
    "http".to_string()
}

fn default_connection_timeout() -> u64 {
    60
}
