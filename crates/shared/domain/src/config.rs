use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level application configuration shared across services.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfigInner {
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub assets: AssetsConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(flatten, default)]
    inner: Arc<AppConfigInner>,
}

impl Deref for AppConfig {
    type Target = AppConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for AppConfig {
    fn deref_mut(&mut self) -> &mut AppConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// `SurrealDB` connection configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub credentials: Option<DatabaseCredentials>,
}

/// `SurrealDB` root credentials (optional when using unauthenticated engines like mem://).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseCredentials {
    pub username: String,
    pub password: String,
}

/// Artifact store roots and limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub static_dir: PathBuf,
    /// Transparent LZ4 compression for artifact payloads.
    pub compression: bool,
    /// Upper bound for a single uploaded artifact, in bytes.
    pub max_artifact_bytes: u64,
}

/// Frontend asset build inputs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Declarative stylesheet pipeline record consumed by the CSS build tool.
    pub stylesheet: PathBuf,
}

/// Security knobs: admin account, session tokens, share codes.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub admin: AdminConfig,
    pub session: SessionConfig,
    pub share: ShareConfig,
    pub token_cache: TokenCacheConfig,
}

/// Bootstrap admin account. Override both fields in any real deployment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

/// Admin session token settings (HS256 bearer tokens).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_seconds: u64,
}

/// Short-lived share code settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    pub ttl_seconds: u64,
    pub code_cache_capacity: u64,
}

/// Credential lookup cache for the sync API. The TTL bounds how long a
/// revoked credential may still be honored by other replicas.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TokenCacheConfig {
    pub ttl_seconds: u64,
    pub capacity: u64,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::LOCALHOST), port: 8080, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "mem://".to_owned(),
            namespace: "vhub".to_owned(),
            database: "core".to_owned(),
            credentials: Some(DatabaseCredentials::default()),
        }
    }
}

impl Default for DatabaseCredentials {
    fn default() -> Self {
        Self { username: "root".to_owned(), password: "root".to_owned() }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            static_dir: PathBuf::from("static"),
            compression: false,
            max_artifact_bytes: 32 * 1024 * 1024,
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self { stylesheet: PathBuf::from("assets/stylesheet.json") }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self { username: "admin".to_owned(), password: "admin123".to_owned() }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { secret: "dev-only-change-me".to_owned(), ttl_seconds: 604_800 }
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self { ttl_seconds: 3600, code_cache_capacity: 10_000 }
    }
}

impl Default for TokenCacheConfig {
    fn default() -> Self {
        Self { ttl_seconds: 60, capacity: 10_000 }
    }
}
