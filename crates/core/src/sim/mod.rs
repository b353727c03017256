//! Stand-in collaborators for running a session without an arm attached.

use nalgebra::Point3;

use crate::{
    ActuatorPublisher, ApertureCommand, CartesianTolerance, LightPaintError, MotionPlanner, Pose,
    Result,
};

/// Reach of a Franka Panda measured from the base (metres).
pub const PANDA_REACH: f64 = 0.855;

/// Kinematics-free arm that only knows how far it can reach.
///
/// A Cartesian path stops at the first waypoint outside the reach sphere and
/// reports the reachable share of waypoints as its coverage.
#[derive(Debug, Clone)]
pub struct SimulatedArm {
    base: Point3<f64>,
    reach: f64,
    current: Option<Pose>,
    travelled: f64,
    moves: usize,
}

impl Default for SimulatedArm {
    fn default() -> Self {
        Self::new(PANDA_REACH)
    }
}

impl SimulatedArm {
    pub fn new(reach: f64) -> Self {
        Self {
            base: Point3::origin(),
            reach,
            current: None,
            travelled: 0.0,
            moves: 0,
        }
    }

    pub fn current(&self) -> Option<&Pose> {
        self.current.as_ref()
    }

    /// Straight-line distance covered by the end effector so far.
    pub fn travelled(&self) -> f64 {
        self.travelled
    }

    /// Completed single-pose moves plus executed waypoints.
    pub fn moves(&self) -> usize {
        self.moves
    }

    fn reachable(&self, pose: &Pose) -> bool {
        nalgebra::distance(&self.base, &pose.position) <= self.reach
    }

    fn arrive(&mut self, pose: &Pose) {
        if let Some(previous) = &self.current {
            self.travelled += previous.distance_to(pose);
        }
        self.current = Some(*pose);
        self.moves += 1;
    }
}

impl MotionPlanner for SimulatedArm {
    fn go_to_pose(&mut self, pose: &Pose) -> Result<()> {
        if !self.reachable(pose) {
            return Err(LightPaintError::motion(format!(
                "target {:?} is outside the {} m reach",
                pose.position, self.reach
            )));
        }
        self.arrive(pose);
        Ok(())
    }

    fn follow_cartesian_path(
        &mut self,
        waypoints: &[Pose],
        tolerance: &CartesianTolerance,
    ) -> Result<f64> {
        if tolerance.eef_step <= 0.0 {
            return Err(LightPaintError::motion("eef_step must be positive"));
        }

        let reachable = waypoints
            .iter()
            .take_while(|pose| self.reachable(pose))
            .count();
        for pose in &waypoints[..reachable] {
            self.arrive(pose);
        }

        if waypoints.is_empty() {
            Ok(1.0)
        } else {
            Ok(reachable as f64 / waypoints.len() as f64)
        }
    }
}

/// Gripper transport that records and logs every command.
#[derive(Debug, Default, Clone)]
pub struct LoggingGripper {
    history: Vec<ApertureCommand>,
}

impl LoggingGripper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[ApertureCommand] {
        &self.history
    }

    pub fn last(&self) -> Option<&ApertureCommand> {
        self.history.last()
    }
}

impl ActuatorPublisher for LoggingGripper {
    fn publish(&mut self, command: ApertureCommand) -> Result<()> {
        tracing::info!(channels = ?command.channels, "gripper command");
        self.history.push(command);
        Ok(())
    }
}
