//! YAML scene configuration.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! stock scene: camera at (5, 5, 5) with a 60 degree FOV, a half-strength
//! ambient light, a directional light at (10, 10, 5), a royal blue unit box,
//! an axes helper of length 5 and a 10x10 grid.

use crate::animation::TransformDemo;
use crate::scene::CameraConfig;
use cubescene_common::{Color, ColorError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from loading or validating a scene config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid color in `{field}`: {source}")]
    Color {
        field: &'static str,
        #[source]
        source: ColorError,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientConfig {
    pub color: String,
    pub intensity: f32,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            color: "white".into(),
            intensity: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub color: String,
    pub intensity: f32,
}

impl Default for DirectionalConfig {
    fn default() -> Self {
        Self {
            position: [10.0, 10.0, 5.0],
            target: [0.0, 0.0, 0.0],
            color: "white".into(),
            intensity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub size: [f32; 3],
    pub color: String,
    pub roughness: f32,
    pub metalness: f32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            size: [1.0, 1.0, 1.0],
            color: "royalblue".into(),
            roughness: 1.0,
            metalness: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelperConfig {
    pub axes_size: f32,
    pub grid_size: f32,
    pub grid_divisions: u32,
    pub grid_center_color: String,
    pub grid_line_color: String,
    pub show_axes: bool,
    pub show_grid: bool,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            axes_size: 5.0,
            grid_size: 10.0,
            grid_divisions: 10,
            grid_center_color: "#444444".into(),
            grid_line_color: "#888888".into(),
            show_axes: true,
            show_grid: true,
        }
    }
}

/// Top-level scene configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub ambient: AmbientConfig,
    pub directional: DirectionalConfig,
    pub mesh: MeshConfig,
    pub animation: TransformDemo,
    pub helpers: HelperConfig,
    pub background: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            ambient: AmbientConfig::default(),
            directional: DirectionalConfig::default(),
            mesh: MeshConfig::default(),
            animation: TransformDemo::default(),
            helpers: HelperConfig::default(),
            background: "white".into(),
        }
    }
}

impl SceneConfig {
    /// Read and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), "scene config loaded");
        Ok(config)
    }

    /// Parse and validate YAML. Blank input gives the default scene.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let cam = &self.camera;
        if !(cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.fov_degrees must be in (0, 180), got {}",
                cam.fov_degrees
            )));
        }
        if !(cam.near > 0.0 && cam.near < cam.far) {
            return Err(ConfigError::Invalid(format!(
                "camera planes must satisfy 0 < near < far, got near={} far={}",
                cam.near, cam.far
            )));
        }
        if cam.position == cam.target {
            return Err(ConfigError::Invalid(format!(
                "camera.position must differ from camera.target, both are {:?}",
                cam.position
            )));
        }
        if self.mesh.size.iter().any(|s| *s <= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "mesh.size must be positive, got {:?}",
                self.mesh.size
            )));
        }
        if self.helpers.axes_size < 0.0 || self.helpers.grid_size < 0.0 {
            return Err(ConfigError::Invalid(
                "helper sizes must not be negative".into(),
            ));
        }
        if self.helpers.grid_divisions == 0 {
            return Err(ConfigError::Invalid(
                "helpers.grid_divisions must be at least 1".into(),
            ));
        }
        if self.ambient.intensity < 0.0 || self.directional.intensity < 0.0 {
            return Err(ConfigError::Invalid(
                "light intensities must not be negative".into(),
            ));
        }

        for (field, value) in self.color_fields() {
            parse_color(field, value)?;
        }
        Ok(())
    }

    fn color_fields(&self) -> [(&'static str, &str); 6] {
        [
            ("ambient.color", self.ambient.color.as_str()),
            ("directional.color", self.directional.color.as_str()),
            ("mesh.color", self.mesh.color.as_str()),
            ("helpers.grid_center_color", self.helpers.grid_center_color.as_str()),
            ("helpers.grid_line_color", self.helpers.grid_line_color.as_str()),
            ("background", self.background.as_str()),
        ]
    }
}

pub(crate) fn parse_color(field: &'static str, value: &str) -> Result<Color, ConfigError> {
    Color::parse(value).map_err(|source| ConfigError::Color { field, source })
}
