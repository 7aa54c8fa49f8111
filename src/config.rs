//! Server endpoint configuration.

/// Default server host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default WebSocket endpoint path.
pub const DEFAULT_PATH: &str = "/trivia";

/// Where the trivia server lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            path: DEFAULT_PATH.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            path: path.into(),
        }
    }

    /// Get the WebSocket URL for this endpoint.
    pub fn url(&self) -> String {
        server_url(&self.host, self.port, &self.path)
    }
}

pub(crate) fn server_url(host: &str, port: u16, path: &str) -> String {
    let path = path.trim();
    if path.starts_with('/') {
        format!("ws://{}:{}{}", host, port, path)
    } else {
        format!("ws://{}:{}/{}", host, port, path)
    }
}
