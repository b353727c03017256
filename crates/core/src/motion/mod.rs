//! Motion execution on top of an external planning backend.
//!
//! The backend owns inverse kinematics, collision checking and trajectory
//! interpolation. This module only distinguishes single-pose moves from
//! Cartesian strokes and decides how their outcomes are surfaced.

use serde::{Deserialize, Serialize};

use crate::{config::PlanningConfig, LightPaintError, Pose, Result};

/// Tolerances passed with every Cartesian path request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CartesianTolerance {
    /// Maximum deviation between interpolated waypoints (metres).
    pub eef_step: f64,
    /// Zero disables joint-jump detection.
    pub jump_threshold: f64,
}

impl Default for CartesianTolerance {
    fn default() -> Self {
        Self {
            eef_step: 0.01,
            jump_threshold: 0.0,
        }
    }
}

impl From<&PlanningConfig> for CartesianTolerance {
    fn from(config: &PlanningConfig) -> Self {
        Self {
            eef_step: config.eef_step,
            jump_threshold: config.jump_threshold,
        }
    }
}

/// External planning and control backend.
///
/// Both calls block until the arm has finished moving or the backend has
/// given up.
pub trait MotionPlanner {
    /// Plans and executes a move to a single target pose.
    fn go_to_pose(&mut self, pose: &Pose) -> Result<()>;

    /// Plans a continuous Cartesian trajectory through `waypoints` in order
    /// and executes whatever part of it could be planned.
    ///
    /// Returns the fraction of the requested path that was planned.
    fn follow_cartesian_path(
        &mut self,
        waypoints: &[Pose],
        tolerance: &CartesianTolerance,
    ) -> Result<f64>;
}

impl<P: MotionPlanner + ?Sized> MotionPlanner for Box<P> {
    fn go_to_pose(&mut self, pose: &Pose) -> Result<()> {
        (**self).go_to_pose(pose)
    }

    fn follow_cartesian_path(
        &mut self,
        waypoints: &[Pose],
        tolerance: &CartesianTolerance,
    ) -> Result<f64> {
        (**self).follow_cartesian_path(waypoints, tolerance)
    }
}

/// Outcome of a Cartesian stroke that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathExecution {
    pub waypoints: usize,
    /// Fraction of the requested path that was planned, in `[0, 1]`.
    pub coverage: f64,
}

impl PathExecution {
    pub fn is_partial(&self) -> bool {
        self.coverage < 1.0
    }
}

/// Blocking motion front end used by the gesture and the sequencer.
#[derive(Debug)]
pub struct MotionExecutor<P> {
    planner: P,
    tolerance: CartesianTolerance,
}

impl<P: MotionPlanner> MotionExecutor<P> {
    pub fn new(planner: P, tolerance: CartesianTolerance) -> Self {
        Self { planner, tolerance }
    }

    pub fn planner(&self) -> &P {
        &self.planner
    }

    /// Moves to one pose and waits for the backend to settle.
    pub fn move_to_single_pose(&mut self, pose: &Pose) -> Result<()> {
        tracing::debug!(position = ?pose.position, "moving to pose");
        self.planner.go_to_pose(pose).map_err(into_motion_failure)
    }

    /// Follows `poses` as one Cartesian stroke.
    ///
    /// An empty list is a no-op and never reaches the backend. Coverage below
    /// one is logged as a warning and returned to the caller; there is no
    /// replanning.
    pub fn execute_path(&mut self, poses: &[Pose]) -> Result<PathExecution> {
        if poses.is_empty() {
            tracing::debug!("empty path, no motion requested");
            return Ok(PathExecution {
                waypoints: 0,
                coverage: 1.0,
            });
        }

        let coverage = self
            .planner
            .follow_cartesian_path(poses, &self.tolerance)
            .map_err(into_motion_failure)?;

        if !coverage.is_finite() {
            return Err(LightPaintError::motion(format!(
                "planner reported non-finite path coverage {coverage}"
            )));
        }

        let execution = PathExecution {
            waypoints: poses.len(),
            coverage: coverage.clamp(0.0, 1.0),
        };

        if execution.is_partial() {
            tracing::warn!(
                coverage = execution.coverage,
                waypoints = execution.waypoints,
                "cartesian path only partially planned"
            );
        } else {
            tracing::debug!(waypoints = execution.waypoints, "cartesian path executed");
        }

        Ok(execution)
    }
}

fn into_motion_failure(err: LightPaintError) -> LightPaintError {
    match err {
        LightPaintError::MotionFailure(_) => err,
        other => LightPaintError::motion(other.to_string()),
    }
}
