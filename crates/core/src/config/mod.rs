use std::{f64::consts::PI, path::Path, time::Duration};

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::{LightPaintError, Orientation, Result};

/// Session-wide drawing configuration. Loaded once before a run and never
/// mutated while frames are being drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    /// Centre of the drawing space in the robot world frame (metres).
    pub center: Point3<f64>,
    /// End-effector orientation held while drawing.
    pub orientation: Orientation,
    /// Multiplier applied to every frame-local coordinate.
    pub frame_scale: f64,
    /// Yaw swing used by the shake gesture (radians).
    pub shake_angle: f64,
    pub light: LightConfig,
    pub timing: TimingConfig,
    pub planning: PlanningConfig,
    /// Shake repetitions performed once the last frame is done. Zero disables
    /// the acknowledgement.
    pub completion_shakes: u32,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            center: Point3::new(0.5, 0.0, 0.5),
            orientation: Orientation::new(PI, 0.0, -PI / 4.0),
            frame_scale: 0.004,
            shake_angle: PI / 8.0,
            light: LightConfig::default(),
            timing: TimingConfig::default(),
            planning: PlanningConfig::default(),
            completion_shakes: 0,
        }
    }
}

impl DrawConfig {
    /// Parses a JSON document and validates the result.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.frame_scale.is_finite() || self.frame_scale <= 0.0 {
            return Err(LightPaintError::config(format!(
                "frame_scale must be a positive finite number, got {}",
                self.frame_scale
            )));
        }

        for (name, value) in [
            ("center.x", self.center.x),
            ("center.y", self.center.y),
            ("center.z", self.center.z),
            ("orientation.roll", self.orientation.roll),
            ("orientation.pitch", self.orientation.pitch),
            ("orientation.yaw", self.orientation.yaw),
            ("shake_angle", self.shake_angle),
            ("light.on_distance", self.light.on_distance),
            ("light.off_distance", self.light.off_distance),
        ] {
            if !value.is_finite() {
                return Err(LightPaintError::config(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }

        for (name, value) in [
            ("timing.settle_seconds", self.timing.settle_seconds),
            ("timing.processing_seconds", self.timing.processing_seconds),
        ] {
            if Duration::try_from_secs_f64(value).is_err() {
                return Err(LightPaintError::config(format!(
                    "{name} must be a non-negative number of seconds a wait can hold, got {value}"
                )));
            }
        }

        if !self.planning.eef_step.is_finite() || self.planning.eef_step <= 0.0 {
            return Err(LightPaintError::config(format!(
                "planning.eef_step must be a positive finite number, got {}",
                self.planning.eef_step
            )));
        }

        if !self.planning.jump_threshold.is_finite() || self.planning.jump_threshold < 0.0 {
            return Err(LightPaintError::config(format!(
                "planning.jump_threshold must be a non-negative finite number, got {}",
                self.planning.jump_threshold
            )));
        }

        Ok(())
    }
}

/// Gripper aperture presets. Closing the gripper switches the light on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub on_distance: f64,
    pub off_distance: f64,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            on_distance: 0.03,
            off_distance: 0.05,
        }
    }
}

/// Fixed waits around each exposure, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Wait after light-on before the stroke starts.
    pub settle_seconds: f64,
    /// Wait after light-off for camera capture and readout.
    pub processing_seconds: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_seconds: 1.0,
            processing_seconds: 20.0,
        }
    }
}

impl TimingConfig {
    pub fn settle_delay(&self) -> Duration {
        seconds(self.settle_seconds)
    }

    pub fn processing_delay(&self) -> Duration {
        seconds(self.processing_seconds)
    }
}

/// Tolerances handed to the Cartesian planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// Maximum end-effector step between interpolated waypoints (metres).
    pub eef_step: f64,
    /// Joint-space jump threshold; zero disables the check.
    pub jump_threshold: f64,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            eef_step: 0.01,
            jump_threshold: 0.0,
        }
    }
}

// Validation rejects anything `Duration` cannot hold; saturate rather than
// collapse a wait to zero if an unvalidated value slips through.
fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(if value > 0.0 {
        Duration::MAX
    } else {
        Duration::ZERO
    })
}
