//! Viewer configuration.
//!
//! Loaded from YAML; every field has a default so a partial (or empty) file
//! is valid. Command-line flags are layered on top by the binaries.

use crate::types::{Color, Extent};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating a [`ViewerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("frame interval must be finite and positive, got {0} ms")]
    InvalidFrameInterval(f64),
    #[error("window size must be non-zero, got {width}x{height}")]
    InvalidWindowSize { width: u32, height: u32 },
    #[error("field of view must be in (0, 180) degrees, got {0}")]
    InvalidFov(f32),
    #[error("clip planes must satisfy 0 < near < far, got near={near} far={far}")]
    InvalidClipPlanes { near: f32, far: f32 },
    #[error("distance limits must satisfy 0 <= min <= max, got min={min} max={max}")]
    InvalidDistanceLimits { min: f32, max: f32 },
    #[error("damping factor must be in (0, 1], got {0}")]
    InvalidDampingFactor(f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "cubeview".into(),
            width: 1280,
            height: 720,
        }
    }
}

impl WindowConfig {
    pub fn extent(&self) -> Extent {
        Extent::new(self.width, self.height)
    }
}

/// Frame pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Minimum time between two rendered frames, in milliseconds.
    pub target_interval_ms: f64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            target_interval_ms: 16.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Initial distance from the origin along +Z.
    pub distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            distance: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub auto_rotate: bool,
    /// 2.0 is one full orbit every 30 seconds at 60 frames per second.
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            auto_rotate: true,
            auto_rotate_speed: 2.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            enable_damping: false,
            damping_factor: 0.05,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Multisampled rendering when the adapter supports it.
    pub antialias: bool,
    /// Clear to transparent black and composite with the desktop.
    pub transparent: bool,
    /// Clear color for opaque surfaces.
    pub clear_color: Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            antialias: true,
            transparent: true,
            clear_color: Color::rgba(0.1, 0.1, 0.15, 1.0),
        }
    }
}

impl RendererConfig {
    /// The color each frame starts from.
    pub fn effective_clear_color(&self) -> Color {
        if self.transparent {
            Color::TRANSPARENT
        } else {
            self.clear_color
        }
    }
}

/// Complete viewer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub frame: FrameConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub renderer: RendererConfig,
}

impl ViewerConfig {
    /// Read and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Parse and validate YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let interval = self.frame.target_interval_ms;
        if !interval.is_finite() || interval <= 0.0 {
            return Err(ConfigError::InvalidFrameInterval(interval));
        }
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::InvalidWindowSize {
                width: self.window.width,
                height: self.window.height,
            });
        }
        let fov = self.camera.fov_degrees;
        if !(fov > 0.0 && fov < 180.0) {
            return Err(ConfigError::InvalidFov(fov));
        }
        let (near, far) = (self.camera.near, self.camera.far);
        if !(near > 0.0 && near < far) {
            return Err(ConfigError::InvalidClipPlanes { near, far });
        }
        let (min, max) = (self.controls.min_distance, self.controls.max_distance);
        if !(min >= 0.0 && min <= max) {
            return Err(ConfigError::InvalidDistanceLimits { min, max });
        }
        let damping = self.controls.damping_factor;
        if !(damping > 0.0 && damping <= 1.0) {
            return Err(ConfigError::InvalidDampingFactor(damping));
        }
        Ok(())
    }
}
