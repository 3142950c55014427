//! Viewer configuration (window, seed, signs, camera, city). Loaded from config.ron at startup.

use engine_core::Color;
use procgen::{CityConfig, GlowStyle, TextLanguage};
use renderer::OrbitSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persistent viewer settings. Loaded from `config.ron` in the current directory unless another
/// path is given on the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Window width in logical pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Window height in logical pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    /// Fixed city seed. A fresh one is drawn when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Which text pool signs draw from.
    #[serde(default)]
    pub language: TextLanguage,
    /// Glow texture resolution.
    #[serde(default = "default_sign_texture_width")]
    pub sign_texture_width: u32,
    #[serde(default = "default_sign_texture_height")]
    pub sign_texture_height: u32,
    /// Replacement neon colors as `#rrggbb`. Empty keeps the built-in palette.
    #[serde(default)]
    pub neon_palette: Vec<String>,
    #[serde(default)]
    pub camera: OrbitSettings,
    #[serde(default)]
    pub city: CityConfig,
}

/// Largest glow texture side accepted from config.
pub const MAX_SIGN_TEXTURE_SIZE: u32 = 4096;

fn default_window_width() -> u32 {
    1280
}
fn default_window_height() -> u32 {
    720
}
fn default_sign_texture_width() -> u32 {
    512
}
fn default_sign_texture_height() -> u32 {
    256
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            seed: None,
            language: TextLanguage::default(),
            sign_texture_width: default_sign_texture_width(),
            sign_texture_height: default_sign_texture_height(),
            neon_palette: Vec::new(),
            camera: OrbitSettings::default(),
            city: CityConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load config from `path`. If the file is missing or invalid, returns default config.
    pub fn load(path: &Path) -> Self {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) => {
                log::info!("No config at {:?} ({}), using defaults", path, e);
                return Self::default();
            }
        };
        match Self::parse(&data) {
            Ok(mut config) => {
                log::info!("Loaded config from {:?}", path);
                config.camera = config.camera.validated();
                config
            }
            Err(e) => {
                log::warn!("Invalid config at {:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    pub fn parse(data: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(data)
    }

    /// Parsed neon palette. Entries that are not valid colors are skipped with a warning.
    pub fn palette(&self) -> Vec<Color> {
        self.neon_palette
            .iter()
            .filter_map(|entry| match entry.parse::<Color>() {
                Ok(color) => Some(color),
                Err(e) => {
                    log::warn!("Ignoring neon palette entry {:?}: {}", entry, e);
                    None
                }
            })
            .collect()
    }

    /// Glow surface settings. Empty or oversized textures fall back to the defaults.
    pub fn glow_style(&self) -> GlowStyle {
        let defaults = GlowStyle::default();
        let usable = 1..=MAX_SIGN_TEXTURE_SIZE;
        if !usable.contains(&self.sign_texture_width) || !usable.contains(&self.sign_texture_height) {
            log::warn!(
                "Sign texture size {}x{} is outside 1..={}, using {}x{}",
                self.sign_texture_width,
                self.sign_texture_height,
                MAX_SIGN_TEXTURE_SIZE,
                defaults.width,
                defaults.height
            );
            return defaults;
        }
        let scale = self.sign_texture_width as f32 / defaults.width as f32;
        GlowStyle {
            width: self.sign_texture_width,
            height: self.sign_texture_height,
            font_px: defaults.font_px * scale,
            ..defaults
        }
    }
}

/// `config.ron` in the working directory.
pub fn default_config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("config.ron")
}
