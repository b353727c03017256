use crate::{
    DrawConfig, LightPaintError, MotionExecutor, MotionPlanner, Orientation, Pose,
    PoseTransformer, Result,
};

/// Yaw wiggle at the centre of the drawing space, used to signal the
/// operator.
#[derive(Debug, Clone, PartialEq)]
pub struct ShakeGesture {
    transformer: PoseTransformer,
    orientation: Orientation,
    angle: f64,
}

impl ShakeGesture {
    pub fn new(config: &DrawConfig) -> Self {
        Self::with_parts(
            PoseTransformer::new(config),
            config.orientation,
            config.shake_angle,
        )
    }

    pub fn with_parts(transformer: PoseTransformer, orientation: Orientation, angle: f64) -> Self {
        Self {
            transformer,
            orientation,
            angle,
        }
    }

    /// The three poses visited by one repetition: yaw minus the angle, yaw
    /// plus the angle, then back to the drawing yaw.
    pub fn cycle(&self) -> Result<[Pose; 3]> {
        Ok([
            self.transformer
                .center_pose(self.orientation.with_yaw_offset(-self.angle))?,
            self.transformer
                .center_pose(self.orientation.with_yaw_offset(self.angle))?,
            self.transformer.center_pose(self.orientation)?,
        ])
    }

    /// Runs `count` repetitions, each move blocking until done.
    ///
    /// A `count` below one is rejected without moving. A failed move stops the
    /// gesture. Returns the number of moves completed.
    pub fn shake<P: MotionPlanner>(
        &self,
        motion: &mut MotionExecutor<P>,
        count: i64,
    ) -> Result<usize> {
        if count < 1 {
            tracing::warn!(count, "shake not executed");
            return Err(LightPaintError::invalid_argument(format!(
                "shake count must be a positive integer, got {count}"
            )));
        }

        let cycle = self.cycle()?;
        let mut moves = 0;
        for repetition in 0..count {
            for pose in &cycle {
                motion.move_to_single_pose(pose).map_err(|err| {
                    tracing::error!(repetition, moves, %err, "shake interrupted");
                    err
                })?;
                moves += 1;
            }
        }

        tracing::info!(count, moves, "shake complete");
        Ok(moves)
    }
}
