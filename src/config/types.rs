use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory of front-end assets to serve with an SPA fallback.
    #[serde(default)]
    pub static_dir: Option<PathBuf>,

    /// Allowed CORS origin for the API. `None` allows any origin.
    #[serde(default)]
    pub cors_origin: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
            cors_origin: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite file path. Defaults to `galleria.db` in the data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Which object store backend holds the image binaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Fs,
    S3,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Object directory for the `fs` backend. Relative paths resolve
    /// against the data directory.
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,

    /// Bucket name, required for the `s3` backend.
    #[serde(default)]
    pub bucket: Option<String>,

    #[serde(default)]
    pub region: Option<String>,

    /// Custom endpoint for S3-compatible services (MinIO, RustFS).
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Use path-style bucket addressing; most S3-compatible services
    /// require this.
    #[serde(default)]
    pub force_path_style: bool,
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("./data/objects")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Fs,
            root: default_storage_root(),
            bucket: None,
            region: None,
            endpoint_url: None,
            force_path_style: false,
        }
    }
}
