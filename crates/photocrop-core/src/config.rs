//! Crop session configuration.
//!
//! Field names deserialize from the camelCase option keys used by the
//! JavaScript host (`zoomSpeed`, `outputWidth`, ...). Every field is
//! optional; missing fields take the defaults below.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::FilterType;
use crate::gesture::GestureConfig;
use crate::viewport::{DisplayBox, OutputSize, ZoomAnchor};

/// Invalid configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be a positive finite number, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("{name} must be a non-negative finite number, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("{name} must be non-zero when set")]
    ZeroOutput { name: &'static str },
}

/// Options for one crop session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CropConfig {
    #[serde(flatten)]
    pub gesture: GestureConfig,
    /// Coalesce redraws into one per animation tick instead of signalling
    /// every change immediately.
    #[serde(alias = "useRequestAnimationFrame")]
    pub use_animation_frame: bool,
    /// Export width; falls back to the display box width.
    pub output_width: Option<u32>,
    /// Export height; falls back to the display box height.
    pub output_height: Option<u32>,
    pub zoom_anchor: ZoomAnchor,
    pub export_filter: FilterType,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            gesture: GestureConfig::default(),
            use_animation_frame: true,
            output_width: None,
            output_height: None,
            zoom_anchor: ZoomAnchor::TopLeft,
            export_filter: FilterType::Bilinear,
        }
    }
}

impl CropConfig {
    /// Reject values the gesture math cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("scrollSpeed", self.gesture.scroll_speed),
            ("zoomSpeed", self.gesture.zoom_speed),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }

        let delay = self.gesture.zoom_delay;
        if !(delay.is_finite() && delay >= 0.0) {
            return Err(ConfigError::Negative {
                name: "zoomDelay",
                value: delay,
            });
        }

        if self.output_width == Some(0) {
            return Err(ConfigError::ZeroOutput { name: "outputWidth" });
        }
        if self.output_height == Some(0) {
            return Err(ConfigError::ZeroOutput {
                name: "outputHeight",
            });
        }
        Ok(())
    }

    /// Export size for a display box, honouring configured overrides.
    pub fn output_size(&self, display: DisplayBox) -> OutputSize {
        OutputSize::new(
            self.output_width.unwrap_or(display.width.round() as u32),
            self.output_height.unwrap_or(display.height.round() as u32),
        )
    }
}
