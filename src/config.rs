//! Runtime configuration, read from a TOML file.

use std::io::ErrorKind;
use std::path::Path;

use log::{info, warn};
use serde::Deserialize;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "WIBBLE_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "wibble.toml";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub server: ServerConfig,
    pub camera: CameraConfig,
    /// One GLSL file holding both shader stages.
    pub shader_path: String,
    pub clear_color: [f32; 4],
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Prefixed to `endpoint`. Empty means the page's own origin.
    pub url: String,
    pub endpoint: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub yfov: f32,
    pub znear: f32,
    pub zfar: f32,
    pub position: [f32; 3],
}

impl Default for Config {
    fn default() -> Self {
        Config {
            window: WindowConfig::default(),
            server: ServerConfig::default(),
            camera: CameraConfig::default(),
            shader_path: "shaders/molecule.glsl".to_string(),
            clear_color: [0.5, 0.5, 0.5, 1.0],
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig {
            title: env!("CARGO_PKG_NAME").to_string(),
            width: 948,
            height: 533,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        let url = if cfg!(target_family = "wasm") {
            String::new()
        } else {
            "http://127.0.0.1:8080".to_string()
        };
        ServerConfig {
            url,
            endpoint: "/data".to_string(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        CameraConfig {
            yfov: 45.0,
            znear: 0.1,
            zfar: 1000.0,
            position: [0.0, 0.0, 5.0],
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    pub fn from_toml(contents: &str) -> Result<Config, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Config::from_toml(&contents)
    }

    /// Loads the file named by `WIBBLE_CONFIG` (or `wibble.toml`), falling
    /// back to the defaults if it is missing or broken.
    pub fn load() -> Config {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        match Config::load_from_file(&path) {
            Ok(config) => {
                info!("loaded configuration from {path}");
                config
            }
            Err(ConfigError::Io(err)) if err.kind() == ErrorKind::NotFound => {
                info!("no configuration at {path}, using defaults");
                Config::default()
            }
            Err(err) => {
                warn!("ignoring configuration at {path}: {err}");
                Config::default()
            }
        }
    }

    /// Full URL of the exchange endpoint.
    pub fn exchange_url(&self) -> String {
        format!("{}{}", self.server.url.trim_end_matches('/'), self.server.endpoint)
    }
}
