//! Configuration for the flytrap overlay
//!
//! A `FlyTrapConfig` is supplied once when an overlay starts and is never
//! mutated while that overlay is alive.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::delivery::Delivery;

/// 24-bit RGB color, serialized as `#RRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value; any alpha byte is ignored
    pub const fn from_u32(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }

    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Convert to image crate RGBA format
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.to_u32())
    }
}

/// Error returned when a color string is not `#RRGGBB`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}, expected #RRGGBB")]
pub struct ParseRgbError(String);

impl FromStr for Rgb {
    type Err = ParseRgbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseRgbError(s.to_string()));
        }
        u32::from_str_radix(hex, 16)
            .map(Self::from_u32)
            .map_err(|_| ParseRgbError(s.to_string()))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Rendering quality of the shade screenshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenshotQuality {
    Low,
    Auto,
    #[default]
    High,
}

impl ScreenshotQuality {
    /// Whether shapes are drawn with anti-aliasing
    pub fn anti_alias(self) -> bool {
        !matches!(self, ScreenshotQuality::Low)
    }
}

/// Overlay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlyTrapConfig {
    /// Ring color of newly placed markers
    #[serde(default = "default_accent_color")]
    pub accent_color: Rgb,
    /// Ring color of the marker being edited
    #[serde(default = "default_active_color")]
    pub active_color: Rgb,
    /// Radius given to a marker on placement
    #[serde(default = "default_radius")]
    pub default_radius: f32,
    #[serde(default)]
    pub screenshot_quality: ScreenshotQuality,
    /// Where finished reports go; `None` leaves delivery to the host
    #[serde(default)]
    pub delivery: Option<Delivery>,
}

fn default_accent_color() -> Rgb {
    Rgb::from_u32(0x33B5E5) // holo blue light
}

fn default_active_color() -> Rgb {
    Rgb::from_u32(0x00FFFF)
}

fn default_radius() -> f32 {
    56.0
}

impl Default for FlyTrapConfig {
    fn default() -> Self {
        Self {
            accent_color: default_accent_color(),
            active_color: default_active_color(),
            default_radius: default_radius(),
            screenshot_quality: ScreenshotQuality::default(),
            delivery: None,
        }
    }
}

impl FlyTrapConfig {
    /// Directory name under the platform config dir
    pub const ID: &'static str = "flytrap";

    /// Default location of the persisted configuration
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("No config directory available, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from `path`, falling back to defaults on any error
    pub fn load_from(path: &Path) -> Self {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) => {
                log::warn!("Could not read config {}: {}", path.display(), err);
                return Self::default();
            }
        };
        match serde_json::from_str(&data) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    /// Save configuration to its default location
    pub fn save(&self) {
        let Some(path) = Self::default_path() else {
            log::error!("No config directory available for saving");
            return;
        };
        if let Err(err) = self.save_to(&path) {
            log::error!("Failed to save config: {:?}", err);
        }
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)
    }
}
