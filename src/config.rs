use std::net::SocketAddr;

use url::Url;

/// Prefix prepended to the configured secret to form the backend bearer token.
pub const TOKEN_PREFIX: &str = "sk-ac-";

pub const ENV_API_SERVER_URL: &str = "API_SERVER_URL";
/// Read when `API_SERVER_URL` is unset, for deployments that share the
/// frontend's environment.
pub const ENV_LEGACY_API_SERVER_URL: &str = "NEXT_PUBLIC_API_SERVER_URL";
pub const ENV_BEARER_TOKEN: &str = "ROOT_API_BEARER_TOKEN";
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_MAX_UPLOAD_BYTES: &str = "MAX_UPLOAD_BYTES";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024; // 64 MiB

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Connection settings for the artifact backend.
#[derive(Clone)]
pub struct BackendConfig {
    pub base_url: Url,
    pub auth_secret: String,
}

impl BackendConfig {
    pub fn new(base_url: &str, auth_secret: impl Into<String>) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(base_url)?;
        let auth_secret = auth_secret.into();
        if auth_secret.is_empty() {
            return Err(ConfigError::Invalid {
                name: ENV_BEARER_TOKEN,
                reason: "must not be empty".to_string(),
            });
        }

        Ok(Self {
            base_url,
            auth_secret,
        })
    }

    /// Full bearer token sent to the backend.
    pub fn bearer_token(&self) -> String {
        format!("{}{}", TOKEN_PREFIX, self.auth_secret)
    }
}

// The secret must never end up in logs.
impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url.as_str())
            .field("auth_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub bind_addr: SocketAddr,
    pub backend: BackendConfig,
    /// Largest inbound request body accepted by the upload endpoint.
    pub max_upload_bytes: usize,
}

impl ProxyConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let base_url = set(ENV_API_SERVER_URL)
            .or_else(|| set(ENV_LEGACY_API_SERVER_URL))
            .ok_or(ConfigError::Missing(ENV_API_SERVER_URL))?;
        let auth_secret = lookup(ENV_BEARER_TOKEN)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing(ENV_BEARER_TOKEN))?;

        let bind_addr = lookup(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: ENV_BIND_ADDR,
                reason: e.to_string(),
            })?;

        let max_upload_bytes = match lookup(ENV_MAX_UPLOAD_BYTES) {
            Some(raw) => raw.parse::<usize>().map_err(|e| ConfigError::Invalid {
                name: ENV_MAX_UPLOAD_BYTES,
                reason: e.to_string(),
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            bind_addr,
            backend: BackendConfig::new(&base_url, auth_secret)?,
            max_upload_bytes,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        name: ENV_API_SERVER_URL,
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ConfigError::Invalid {
                name: ENV_API_SERVER_URL,
                reason: format!("unsupported scheme '{}'", other),
            })
        }
    }

    if url.cannot_be_a_base() {
        return Err(ConfigError::Invalid {
            name: ENV_API_SERVER_URL,
            reason: "must be an absolute base URL".to_string(),
        });
    }

    Ok(url)
}
