use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration, read once at startup from `VENUED_*` environment
/// variables. The secret has no default: it was a hard-coded literal once and
/// must now always be supplied externally.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    /// Shared authentication secret (`VENUED_SECRET`, required).
    pub secret: String,
    /// Login user name that gets the admin role.
    pub admin_user: String,
    /// Maximum lifetime of an authenticated session (`VENUED_TOKEN_TTL_SECS`).
    pub token_ttl: Duration,
    /// WAL directory, from `VENUED_STORAGE_URL` (file:// URL or plain path).
    pub data_dir: PathBuf,
    pub max_connections: usize,
    /// WAL appends between background compactions.
    pub compact_threshold: u64,
    pub metrics_port: Option<u16>,
    pub tls_cert: Option<String>,
    pub tls_key: Option<String>,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSecret,
    BadStorageUrl(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingSecret => {
                write!(f, "VENUED_SECRET must be set (no default)")
            }
            ConfigError::BadStorageUrl(url) => {
                write!(f, "unsupported VENUED_STORAGE_URL: {url} (expected file:// or a path)")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_var(name).and_then(|s| s.parse().ok())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = env_var("VENUED_SECRET").ok_or(ConfigError::MissingSecret)?;

        let storage_url =
            env_var("VENUED_STORAGE_URL").unwrap_or_else(|| "file://./data".to_string());
        let data_dir = parse_storage_url(&storage_url)?;

        let token_ttl_secs: u64 = env_parse("VENUED_TOKEN_TTL_SECS").unwrap_or(86_400);

        Ok(Self {
            bind: env_var("VENUED_BIND").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env_parse("VENUED_PORT").unwrap_or(5433),
            secret,
            admin_user: env_var("VENUED_ADMIN_USER").unwrap_or_else(|| "admin".to_string()),
            token_ttl: Duration::from_secs(token_ttl_secs),
            data_dir,
            max_connections: env_parse("VENUED_MAX_CONNECTIONS").unwrap_or(256),
            compact_threshold: env_parse("VENUED_COMPACT_THRESHOLD").unwrap_or(1000),
            metrics_port: env_parse("VENUED_METRICS_PORT"),
            tls_cert: env_var("VENUED_TLS_CERT"),
            tls_key: env_var("VENUED_TLS_KEY"),
        })
    }

    pub fn wal_path(&self) -> PathBuf {
        self.data_dir.join("venued.wal")
    }
}

/// Accept `file://<path>` or a bare filesystem path. Any other scheme is an
/// error rather than a silently misused directory name.
fn parse_storage_url(url: &str) -> Result<PathBuf, ConfigError> {
    if let Some(path) = url.strip_prefix("file://") {
        if path.is_empty() {
            return Err(ConfigError::BadStorageUrl(url.to_string()));
        }
        return Ok(PathBuf::from(path));
    }
    if url.contains("://") {
        return Err(ConfigError::BadStorageUrl(url.to_string()));
    }
    Ok(PathBuf::from(url))
}
