//! Editor configuration.

use crate::classes::ClassRegistry;
use crate::error::ConfigError;
use crate::geometry::DEFAULT_CIRCLE_SEGMENTS;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable constants for an editing session.
///
/// Every field has a default, so a partial JSON document only overrides what
/// it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Number of undo snapshots kept.
    pub history_capacity: usize,
    pub min_scale: f64,
    pub max_scale: f64,
    /// Scale factor for one wheel step towards the user (zoom in).
    pub wheel_zoom_in: f64,
    /// Scale factor for one wheel step away from the user (zoom out).
    pub wheel_zoom_out: f64,
    /// Scale factor for the zoom-in command.
    pub step_zoom_in: f64,
    /// Scale factor for the zoom-out command.
    pub step_zoom_out: f64,
    pub min_radius: f64,
    pub max_radius: f64,
    pub default_radius: f64,
    /// Border band for boundary-only circles, in screen pixels.
    pub circle_border_band: f64,
    /// Border band for boundary-only polygons, in screen pixels.
    pub polygon_border_band: f64,
    /// How long a click is ignored after a drag that moved something.
    pub click_suppression_ms: u64,
    pub circle_segments: usize,
    pub classes: ClassRegistry,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: 20,
            min_scale: 0.1,
            max_scale: 5.0,
            wheel_zoom_in: 1.1,
            wheel_zoom_out: 0.9,
            step_zoom_in: 1.2,
            step_zoom_out: 0.8,
            min_radius: 5.0,
            max_radius: 100.0,
            default_radius: 20.0,
            circle_border_band: 5.0,
            polygon_border_band: 8.0,
            click_suppression_ms: 100,
            circle_segments: DEFAULT_CIRCLE_SEGMENTS,
            classes: ClassRegistry::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));
        if self.history_capacity == 0 {
            return invalid("history_capacity must be at least 1");
        }
        if !(self.min_scale > 0.0 && self.min_scale <= self.max_scale) {
            return invalid("scale range must satisfy 0 < min_scale <= max_scale");
        }
        if !(self.min_radius > 0.0 && self.min_radius <= self.max_radius) {
            return invalid("radius range must satisfy 0 < min_radius <= max_radius");
        }
        if self.default_radius < self.min_radius || self.default_radius > self.max_radius {
            return invalid("default_radius must lie within the radius range");
        }
        if self.wheel_zoom_in <= 0.0
            || self.wheel_zoom_out <= 0.0
            || self.step_zoom_in <= 0.0
            || self.step_zoom_out <= 0.0
        {
            return invalid("zoom factors must be positive");
        }
        if self.circle_segments < 3 {
            return invalid("circle_segments must be at least 3");
        }
        self.classes.validate()
    }

    pub fn click_suppression(&self) -> Duration {
        Duration::from_millis(self.click_suppression_ms)
    }

    pub fn clamp_radius(&self, radius: f64) -> f64 {
        radius.clamp(self.min_radius, self.max_radius)
    }
}
