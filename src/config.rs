//! Viewer settings persisted as JSON.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

pub const LIGHT_INTENSITY_RANGE: RangeInclusive<f32> = 0.0..=3.0;
pub const ANIMATION_DURATION_RANGE: RangeInclusive<f32> = 0.5..=10.0;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Environment map the engine lights the scene with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HdrPreset {
    #[default]
    City,
    Studio,
    Sunset,
}

impl HdrPreset {
    pub const ALL: [HdrPreset; 3] = [HdrPreset::City, HdrPreset::Studio, HdrPreset::Sunset];

    pub fn label(&self) -> &'static str {
        match self {
            HdrPreset::City => "city",
            HdrPreset::Studio => "studio",
            HdrPreset::Sunset => "sunset",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub light_intensity: f32,
    pub hdr_preset: HdrPreset,
    pub show_background: bool,
    pub auto_zoom: bool,
    /// Seconds a full open (or close) should take, whatever the clip length.
    pub animation_duration: f32,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            light_intensity: 1.0,
            hdr_preset: HdrPreset::City,
            show_background: true,
            auto_zoom: true,
            animation_duration: 2.0,
        }
    }
}

impl ViewerSettings {
    pub fn validate(&self) -> Result<()> {
        check_range(
            "light_intensity",
            self.light_intensity,
            &LIGHT_INTENSITY_RANGE,
        )?;
        check_range(
            "animation_duration",
            self.animation_duration,
            &ANIMATION_DURATION_RANGE,
        )?;
        Ok(())
    }

    /// Light levels the engine should use for the current settings.
    pub fn environment(&self) -> EnvironmentLighting {
        EnvironmentLighting {
            preset: self.hdr_preset,
            background: self.show_background,
            environment_intensity: self.light_intensity,
            ambient_intensity: 0.2 * self.light_intensity,
            directional_intensity: self.light_intensity,
        }
    }
}

fn check_range(field: &'static str, value: f32, range: &RangeInclusive<f32>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!(
                "{} is outside {}..={}",
                value,
                range.start(),
                range.end()
            ),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentLighting {
    pub preset: HdrPreset,
    pub background: bool,
    pub environment_intensity: f32,
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
}

pub fn save_settings(settings: &ViewerSettings, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_settings(path: &Path) -> Result<ViewerSettings> {
    let json = std::fs::read_to_string(path)?;
    let settings: ViewerSettings = serde_json::from_str(&json)?;
    settings.validate()?;
    log::info!("Loaded viewer settings from {}", path.display());
    Ok(settings)
}
