//! Renderer configuration loaded from TOML.
//!
//! Every field has a default, so a partial file (or none at all) is valid:
//!
//! ```toml
//! frames_in_flight = 3
//!
//! [backend]
//! kind = "software"
//! workers = 4
//!
//! [capture]
//! resolution = 128
//! mip_levels = 6
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use radiance_core::texture::max_mip_count;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::BackendConfig;
use crate::types::TextureFormat;

/// Errors raised while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Parameters of one probe capture: the cube render and its convolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Face size of the captured cube map, in texels.
    pub resolution: u32,
    /// Roughness levels in the filtered chain. Level 0 is the mirror reflection.
    pub mip_levels: u32,
    /// GGX importance samples per filtered texel.
    pub sample_count: u32,
    /// Storage format of the generated texture.
    pub format: TextureFormat,
    /// Surfaces closer than this to the probe are ignored.
    pub near_plane: f32,
    /// Surfaces farther than this from the probe are ignored.
    pub far_plane: f32,
    /// How long blocking captures wait for the fence, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            resolution: 256,
            mip_levels: 8,
            sample_count: 64,
            format: TextureFormat::Rgba16Float,
            near_plane: 0.05,
            far_plane: 1000.0,
            timeout_ms: 10_000,
        }
    }
}

impl CaptureConfig {
    /// Returns a copy with every field forced into its usable range.
    ///
    /// The mip count is clamped to the chain length the resolution allows.
    #[must_use]
    pub fn validated(&self) -> Self {
        let resolution = self.resolution.max(1);
        let near_plane = if self.near_plane.is_finite() {
            self.near_plane.max(0.0)
        } else {
            0.0
        };
        let far_plane = if self.far_plane.is_nan() || self.far_plane <= near_plane {
            f32::INFINITY
        } else {
            self.far_plane
        };
        Self {
            resolution,
            mip_levels: self.mip_levels.clamp(1, max_mip_count(resolution)),
            sample_count: self.sample_count.max(1),
            format: self.format,
            near_plane,
            far_plane,
            timeout_ms: self.timeout_ms,
        }
    }

    /// Blocking-capture timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns a copy with the given resolution.
    #[must_use]
    pub const fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    /// Returns a copy with the given roughness level count.
    #[must_use]
    pub const fn with_mip_levels(mut self, mip_levels: u32) -> Self {
        self.mip_levels = mip_levels;
        self
    }

    /// Returns a copy with the given sample count.
    #[must_use]
    pub const fn with_sample_count(mut self, sample_count: u32) -> Self {
        self.sample_count = sample_count;
        self
    }
}

/// Top-level renderer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Frames the CPU may run ahead of the backend.
    pub frames_in_flight: usize,
    /// How long `begin_frame` waits for a slot, in milliseconds.
    pub frame_timeout_ms: u64,
    /// Edge length of the probe influence grid cells, in world units.
    pub probe_grid_cell_size: f32,
    /// Device memory budget for textures, in bytes.
    pub memory_budget: u64,
    pub backend: BackendConfig,
    pub capture: CaptureConfig,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            frames_in_flight: 2,
            frame_timeout_ms: 1000,
            probe_grid_cell_size: 8.0,
            memory_budget: 1 << 30,
            backend: BackendConfig::default(),
            capture: CaptureConfig::default(),
        }
    }
}

impl RendererConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load a configuration, falling back to defaults when the file is
    /// missing or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                log::info!("Loaded renderer config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("No usable renderer config ({e}), using defaults");
                Self::default()
            }
        }
    }

    /// Frame-slot wait timeout.
    pub fn frame_timeout(&self) -> Duration {
        Duration::from_millis(self.frame_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendKind;

    #[test]
    fn test_defaults() {
        let config = RendererConfig::default();
        assert_eq!(config.frames_in_flight, 2);
        assert_eq!(config.capture.resolution, 256);
        assert_eq!(config.capture.mip_levels, 8);
        assert_eq!(config.capture.format, TextureFormat::Rgba16Float);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = RendererConfig::from_toml_str(
            r#"
            frames_in_flight = 3

            [backend]
            kind = "dummy"

            [capture]
            resolution = 64
            format = "rgba32_float"
            "#,
        )
        .unwrap();
        assert_eq!(config.frames_in_flight, 3);
        assert_eq!(config.backend.kind, BackendKind::Dummy);
        assert_eq!(config.capture.resolution, 64);
        assert_eq!(config.capture.format, TextureFormat::Rgba32Float);
        assert_eq!(config.capture.mip_levels, 8);
        assert_eq!(config.frame_timeout_ms, 1000);
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let result = RendererConfig::from_toml_str("frames_in_flight = \"two\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = RendererConfig::load_or_default(Path::new("/nonexistent/radiance.toml"));
        assert_eq!(config, RendererConfig::default());
    }

    #[test]
    fn test_validated_clamps_mips_and_planes() {
        let config = CaptureConfig {
            resolution: 16,
            mip_levels: 12,
            sample_count: 0,
            near_plane: -1.0,
            far_plane: f32::NAN,
            ..CaptureConfig::default()
        }
        .validated();
        assert_eq!(config.mip_levels, 5);
        assert_eq!(config.sample_count, 1);
        assert_eq!(config.near_plane, 0.0);
        assert_eq!(config.far_plane, f32::INFINITY);
    }
}
