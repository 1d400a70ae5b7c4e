//! Shared types and configuration for the cubeview workspace.
//!
//! # Invariants
//! - Pixel sizes are integer extents; aspect ratios are always derived
//!   through [`Extent::aspect_ratio`] so every resize path agrees.
//! - A validated [`ViewerConfig`] never carries a non-positive frame interval.

pub mod config;
pub mod types;

pub use config::{
    CameraConfig, ConfigError, ControlsConfig, FrameConfig, RendererConfig, ViewerConfig,
    WindowConfig,
};
pub use types::{Color, Extent, Transform};

pub fn crate_info() -> &'static str {
    "cubeview-common v0.1.0"
}
