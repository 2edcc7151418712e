use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use docsift_server::{ServerConfig, DEFAULT_MAX_UPLOAD_BYTES};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub http: HttpSection,
    pub uploads: UploadsSection,
    pub storage: StorageSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub static_dir: Option<PathBuf>,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadsSection {
    pub temp_dir: PathBuf,
}

impl Default for UploadsSection {
    fn default() -> Self {
        Self {
            temp_dir: PathBuf::from("uploads"),
        }
    }
}

/// Leaving `sqlite_path` unset runs the service without persistence.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub sqlite_path: Option<String>,
}

impl RuntimeConfig {
    /// Reads the TOML file if one was given, otherwise starts from defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&source)
            .with_context(|| format!("invalid config TOML at {}", path.display()))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.http.host, self.http.port)
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            max_upload_bytes: self.http.max_upload_bytes,
            static_dir: self.http.static_dir.clone(),
        }
    }
}
