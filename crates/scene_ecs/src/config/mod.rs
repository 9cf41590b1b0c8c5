//! Configuration system
//!
//! Scene settings are plain serde structs. Any of them can be loaded from a
//! `.toml` or `.ron` file through the [`Config`] trait; missing keys fall back
//! to the defaults below.

use std::path::Path;

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file, picking the format from the extension
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let contents = std::fs::read_to_string(path)?;
        log::debug!("Loading configuration from {}", path.display());
        format.parse(&contents)
    }

    /// Save configuration to file, picking the format from the extension
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = ConfigFormat::from_path(path)?.render(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (`.toml`)
    Toml,
    /// Rusty Object Notation (`.ron`)
    Ron,
}

impl ConfigFormat {
    /// Determine the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Parse a configuration from text in this format
    pub fn parse<T: for<'de> Deserialize<'de>>(self, contents: &str) -> Result<T, ConfigError> {
        match self {
            Self::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Self::Ron => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Render a configuration as text in this format
    pub fn render<T: Serialize>(self, value: &T) -> Result<String, ConfigError> {
        match self {
            Self::Toml => {
                toml::to_string_pretty(value).map_err(|e| ConfigError::Serialize(e.to_string()))
            }
            Self::Ron => ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string())),
        }
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// # Scene Configuration
///
/// Top-level settings consumed by the registry, the lighting system, the
/// free-flight controller and the frame loop of a driver binary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Component registry sizing
    pub registry: RegistryConfig,
    /// Light slot limits and ambient color
    pub lighting: LightingConfig,
    /// Free-flight tuning
    pub flight: FlightConfig,
    /// Frame loop settings
    pub frame: FrameConfig,
}

impl Config for SceneConfig {}

/// # Registry Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Number of component slots reserved up front
    pub initial_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 256,
        }
    }
}

/// # Lighting Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// Number of light slots the shading backend exposes
    pub max_lights: usize,
    /// Ambient light color (RGBA, normalized)
    pub ambient_color: [f32; 4],
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            max_lights: 4,
            ambient_color: [0.2, 0.2, 0.2, 1.0],
        }
    }
}

/// # Flight Configuration
///
/// Defaults applied to newly created flight data and the controller's
/// modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    /// Linear speed in units per second
    pub speed: f32,
    /// Keyboard rotation speed in degrees per second
    pub rotation_speed: f32,
    /// Speed multiplier while boosting
    pub boost_multiplier: f32,
    /// Degrees of rotation per pixel of mouse movement
    pub mouse_sensitivity: f32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            speed: 10.0,
            rotation_speed: 180.0,
            boost_multiplier: 5.0,
            mouse_sensitivity: 0.2,
        }
    }
}

/// # Frame Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Target frames per second of the driver loop
    pub target_fps: u32,
    /// Largest delta time handed to `update`, in seconds
    pub max_delta_time: f32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            target_fps: 144,
            max_delta_time: 0.25,
        }
    }
}

impl FrameConfig {
    /// Fixed step matching the target frame rate
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fixed_delta_time(&self) -> f32 {
        1.0 / self.target_fps.max(1) as f32
    }
}
