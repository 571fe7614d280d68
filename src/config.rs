use std::fs;
use std::path::Path;

use egui::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Zoom scales are kept to two decimals, so a smaller step would never move them.
pub const MIN_ZOOM_STEP: f32 = 0.01;

/// Tunables of a drawing board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Scale change per wheel tick
    pub zoom_step: f32,
    /// Lowest scale the wheel can reach
    pub min_scale: f32,
    /// Maximum number of undo entries
    pub history_limit: usize,
    /// Radius of the anchor dot shown while sizing circles and ellipses
    pub anchor_radius: f32,
    /// Added to the brush width to get its hit width
    pub brush_hit_padding: f32,
    pub canvas_size: Vec2,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            zoom_step: 0.05,
            min_scale: 0.2,
            history_limit: 20,
            anchor_radius: 3.0,
            brush_hit_padding: 8.0,
            canvas_size: Vec2::new(2000.0, 2000.0),
        }
    }
}

impl BoardConfig {
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::debug!("loaded board config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.zoom_step.is_finite() || self.zoom_step < MIN_ZOOM_STEP {
            return Err(ConfigError::Invalid(format!(
                "zoom_step must be at least {MIN_ZOOM_STEP}, got {}",
                self.zoom_step
            )));
        }
        if !self.min_scale.is_finite() || self.min_scale <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "min_scale must be positive, got {}",
                self.min_scale
            )));
        }
        if self.history_limit == 0 {
            return Err(ConfigError::Invalid("history_limit must not be zero".into()));
        }
        Ok(())
    }
}
