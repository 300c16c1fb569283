//! Configuration loading and validation

use anyhow::{Context, Result};
use glam::Vec3;
use handorbit_core::GestureConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub daemon: DaemonConfig,
    #[serde(default)]
    pub gestures: GestureConfig,
    #[serde(default)]
    pub camera: CameraConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Bind address for web server
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Detection frames buffered ahead of the processor
    #[serde(default = "default_frame_queue")]
    pub frame_queue: usize,
    /// Directory served as the static web frontend
    #[serde(default = "default_web_root")]
    pub web_root: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            frame_queue: default_frame_queue(),
            web_root: default_web_root(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8090".to_string()
}

fn default_frame_queue() -> usize {
    64
}

fn default_web_root() -> String {
    "web".to_string()
}

/// Starting pose of the orbit camera
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_camera_position")]
    pub position: [f32; 3],
    /// Orbit target the camera rotates around
    #[serde(default)]
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_camera_position(),
            target: [0.0; 3],
        }
    }
}

fn default_camera_position() -> [f32; 3] {
    [0.0, 0.0, 10.0]
}

impl CameraConfig {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn target(&self) -> Vec3 {
        Vec3::from_array(self.target)
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.gestures.validate()?;
        if self.daemon.frame_queue == 0 {
            anyhow::bail!("daemon.frame_queue must be at least 1");
        }
        let camera = &self.camera;
        if !(camera.position().is_finite() && camera.target().is_finite()) {
            anyhow::bail!("camera position and target must be finite");
        }
        Ok(())
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    let config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        info!(path = %path.display(), "Loaded configuration");
        config
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Config::default()
    };

    config.validate()?;
    Ok(config)
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(&Config::default())?;
    std::fs::write(path, content)?;
    Ok(())
}
