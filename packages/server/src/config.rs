use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    20
}

fn default_connect_timeout_secs() -> u64 {
    8
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Lifetime of issued tokens.
    pub token_ttl_hours: i64,
    /// Admin account created on startup when missing.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssetBackend {
    Filesystem,
    S3,
}

/// When orphaned images are deleted relative to the HTTP response.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CleanupMode {
    /// Await deletions before responding.
    Inline,
    /// Spawn deletions and respond immediately.
    Background,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FilesystemAssetConfig {
    pub root: PathBuf,
    pub public_base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct S3AssetConfig {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key: String,
    pub secret_key: String,
    pub path_style: bool,
    pub public_base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssetConfig {
    pub backend: AssetBackend,
    /// Folder every upload is placed in; also used to derive identifiers
    /// from legacy bare URLs.
    pub folder: String,
    pub cleanup: CleanupMode,
    /// Per-image upload limit in bytes.
    pub max_upload_size: u64,
    pub filesystem: FilesystemAssetConfig,
    pub s3: Option<S3AssetConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub assets: AssetConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("auth.token_ttl_hours", 8)?
            .set_default("assets.backend", "filesystem")?
            .set_default("assets.folder", "heavy_horizon")?
            .set_default("assets.cleanup", "background")?
            .set_default("assets.max_upload_size", 10 * 1024 * 1024)?
            .set_default("assets.filesystem.root", "./data/media")?
            .set_default(
                "assets.filesystem.public_base_url",
                "http://127.0.0.1:5000/api/v1/media",
            )?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., HORIZON__AUTH__JWT_SECRET)
            .add_source(Environment::with_prefix("HORIZON").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
