mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./galleria.toml",
        "./config.toml",
        "~/.config/galleria/config.toml",
        "/etc/galleria/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.storage.backend == StorageBackend::S3 && config.storage.bucket.is_none() {
        anyhow::bail!("Storage backend 's3' requires a bucket name");
    }

    if let Some(ref origin) = config.server.cors_origin {
        if origin.is_empty() {
            anyhow::bail!("cors_origin cannot be empty; omit it to allow any origin");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Fs);
        assert!(config.database.path.is_none());
    }

    #[test]
    fn test_load_minimal_config() {
        let file = write_config("[server]\nport = 9000\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_load_s3_config() {
        let file = write_config(
            r#"
[storage]
backend = "s3"
bucket = "gallery-images"
region = "eu-west-1"
endpoint_url = "http://localhost:9000"
force_path_style = true
"#,
        );
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::S3);
        assert_eq!(config.storage.bucket.as_deref(), Some("gallery-images"));
        assert!(config.storage.force_path_style);
    }

    #[test]
    fn test_s3_without_bucket_rejected() {
        let file = write_config("[storage]\nbackend = \"s3\"\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_zero_port_rejected() {
        let file = write_config("[server]\nport = 0\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let file = write_config("not valid toml [[");
        assert!(load_config(file.path()).is_err());
    }
}
