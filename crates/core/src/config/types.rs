use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    10443
}

/// Authentication configuration
///
/// Guards the index page and the upload/download submission routes.
/// Serving stored files and job status is never authenticated.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
    /// Username required when method = "basic"
    #[serde(default)]
    pub username: Option<String>,
    /// Password required when method = "basic"
    #[serde(default)]
    pub password: Option<String>,
}

impl AuthConfig {
    pub fn none() -> Self {
        Self {
            method: AuthMethod::None,
            username: None,
            password: None,
        }
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            method: AuthMethod::Basic,
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    None,
    Basic,
}

/// Content store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root of the content-addressed tree. Jobs live under `<root>/tmp`.
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
    /// Maximum accepted size of a direct upload body
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("files")
}

fn default_max_upload_bytes() -> usize {
    100_000_000
}

/// Outbound fetch configuration for the download pipeline
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    /// Skip TLS certificate validation for submitted URLs.
    /// Needed for self-signed origins; off unless explicitly enabled.
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Store the body of non-2xx responses instead of failing the job
    #[serde(default)]
    pub accept_error_status: bool,
    /// Overall request timeout in seconds (default: none)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Connect timeout in seconds (default: 30)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl FetchConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            accept_invalid_certs: false,
            accept_error_status: false,
            timeout_secs: None,
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_connect_timeout() -> u64 {
    30
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub password_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: match config.auth.method {
                    AuthMethod::None => "none".to_string(),
                    AuthMethod::Basic => "basic".to_string(),
                },
                username: config.auth.username.clone(),
                password_configured: config
                    .auth
                    .password
                    .as_deref()
                    .is_some_and(|p| !p.is_empty()),
            },
            server: config.server.clone(),
            storage: config.storage.clone(),
            fetch: config.fetch.clone(),
        }
    }
}
