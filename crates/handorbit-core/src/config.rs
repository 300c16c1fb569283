//! Gesture tuning parameters
//!
//! All thresholds used by gesture interpretation and camera motion live
//! here with their defaults, so deployments can tune them from TOML.

use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;
use std::path::Path;
use thiserror::Error;

/// Thumb/index tip distance (normalized) below which a hand is pinching
pub const DEFAULT_PINCH_THRESHOLD: f32 = 0.05;
/// Radians of camera rotation per unit of normalized hand travel
pub const DEFAULT_ROTATION_SPEED: f32 = 4.0;
/// Distance ratio below which two-hand motion zooms in
pub const DEFAULT_ZOOM_DEAD_ZONE_LOW: f32 = 0.97;
/// Distance ratio above which two-hand motion zooms out
pub const DEFAULT_ZOOM_DEAD_ZONE_HIGH: f32 = 1.03;
/// Multiplier applied to camera distance per zoom step
pub const DEFAULT_ZOOM_STEP: f32 = 1.05;
/// Minimum angle (radians) kept between the camera and either pole
pub const DEFAULT_POLAR_MARGIN: f32 = 0.1;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read gesture config: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse gesture config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid gesture config: {0}")]
    Invalid(String),
}

/// Gesture interpretation and camera motion settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    #[serde(default = "default_pinch_threshold")]
    pub pinch_threshold: f32,
    #[serde(default = "default_rotation_speed")]
    pub rotation_speed: f32,
    #[serde(default = "default_zoom_dead_zone_low")]
    pub zoom_dead_zone_low: f32,
    #[serde(default = "default_zoom_dead_zone_high")]
    pub zoom_dead_zone_high: f32,
    #[serde(default = "default_zoom_step")]
    pub zoom_step: f32,
    #[serde(default = "default_polar_margin")]
    pub polar_margin: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            pinch_threshold: DEFAULT_PINCH_THRESHOLD,
            rotation_speed: DEFAULT_ROTATION_SPEED,
            zoom_dead_zone_low: DEFAULT_ZOOM_DEAD_ZONE_LOW,
            zoom_dead_zone_high: DEFAULT_ZOOM_DEAD_ZONE_HIGH,
            zoom_step: DEFAULT_ZOOM_STEP,
            polar_margin: DEFAULT_POLAR_MARGIN,
        }
    }
}

fn default_pinch_threshold() -> f32 {
    DEFAULT_PINCH_THRESHOLD
}

fn default_rotation_speed() -> f32 {
    DEFAULT_ROTATION_SPEED
}

fn default_zoom_dead_zone_low() -> f32 {
    DEFAULT_ZOOM_DEAD_ZONE_LOW
}

fn default_zoom_dead_zone_high() -> f32 {
    DEFAULT_ZOOM_DEAD_ZONE_HIGH
}

fn default_zoom_step() -> f32 {
    DEFAULT_ZOOM_STEP
}

fn default_polar_margin() -> f32 {
    DEFAULT_POLAR_MARGIN
}

impl GestureConfig {
    /// Load and validate settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load and validate settings from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: GestureConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values describe a usable gesture mapping
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.pinch_threshold.is_finite() && self.pinch_threshold > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "pinch_threshold must be positive, got {}",
                self.pinch_threshold
            )));
        }
        if !self.rotation_speed.is_finite() {
            return Err(ConfigError::Invalid(format!(
                "rotation_speed must be finite, got {}",
                self.rotation_speed
            )));
        }
        let low = self.zoom_dead_zone_low;
        let high = self.zoom_dead_zone_high;
        if !(low > 0.0 && low <= 1.0 && high >= 1.0 && high.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "zoom dead zone must satisfy 0 < low <= 1 <= high, got [{low}, {high}]"
            )));
        }
        if !(self.zoom_step.is_finite() && self.zoom_step > 1.0) {
            return Err(ConfigError::Invalid(format!(
                "zoom_step must be greater than 1, got {}",
                self.zoom_step
            )));
        }
        if !(self.polar_margin >= 0.0 && self.polar_margin < FRAC_PI_2) {
            return Err(ConfigError::Invalid(format!(
                "polar_margin must lie in [0, pi/2), got {}",
                self.polar_margin
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = GestureConfig::default();
        assert_eq!(config.pinch_threshold, 0.05);
        assert_eq!(config.rotation_speed, 4.0);
        assert_eq!(config.zoom_dead_zone_low, 0.97);
        assert_eq!(config.zoom_dead_zone_high, 1.03);
        assert_eq!(config.zoom_step, 1.05);
        assert_eq!(config.polar_margin, 0.1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = GestureConfig::from_toml("rotation_speed = 2.5\n").unwrap();
        assert_eq!(config.rotation_speed, 2.5);
        assert_eq!(config.pinch_threshold, DEFAULT_PINCH_THRESHOLD);
        assert_eq!(config.zoom_step, DEFAULT_ZOOM_STEP);
    }

    #[test]
    fn test_rejects_inverted_dead_zone() {
        let toml = r#"
zoom_dead_zone_low = 1.1
zoom_dead_zone_high = 0.9
"#;
        let err = GestureConfig::from_toml(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = GestureConfig::default();
        config.zoom_step = 1.0;
        assert!(config.validate().is_err());

        let mut config = GestureConfig::default();
        config.pinch_threshold = 0.0;
        assert!(config.validate().is_err());

        let mut config = GestureConfig::default();
        config.polar_margin = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "pinch_threshold = 0.04").unwrap();
        writeln!(file, "zoom_step = 1.1").unwrap();

        let config = GestureConfig::from_file(file.path()).unwrap();
        assert_eq!(config.pinch_threshold, 0.04);
        assert_eq!(config.zoom_step, 1.1);
    }

    #[test]
    fn test_parse_error() {
        let err = GestureConfig::from_toml("pinch_threshold = \"tight\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
