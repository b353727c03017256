//! World-frame poses and the transform from frame-local coordinates.

use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};

use crate::{Coordinate, DrawConfig, LightPaintError, Result};

/// End-effector orientation as static-axis roll/pitch/yaw in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl Orientation {
    pub const fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }

    /// Same roll and pitch, yaw shifted by `delta`.
    pub fn with_yaw_offset(self, delta: f64) -> Self {
        Self {
            yaw: self.yaw + delta,
            ..self
        }
    }

    /// Rotation about fixed X, then Y, then Z.
    pub fn to_quaternion(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_euler_angles(self.roll, self.pitch, self.yaw)
    }

    fn check_finite(&self, context: &str) -> Result<()> {
        for (axis, value) in [("roll", self.roll), ("pitch", self.pitch), ("yaw", self.yaw)] {
            if !value.is_finite() {
                return Err(LightPaintError::invalid_coordinate(axis, value, context));
            }
        }
        Ok(())
    }
}

/// Absolute end-effector target in the robot world frame (metres).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point3<f64>,
    pub orientation: UnitQuaternion<f64>,
}

impl Pose {
    pub fn new(position: Point3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn to_isometry(&self) -> Isometry3<f64> {
        Isometry3::from_parts(Translation3::from(self.position.coords), self.orientation)
    }

    /// Quaternion components in `[x, y, z, w]` order.
    pub fn quaternion_xyzw(&self) -> [f64; 4] {
        let q = self.orientation.quaternion();
        [q.i, q.j, q.k, q.w]
    }

    /// Straight-line distance between the two positions.
    pub fn distance_to(&self, other: &Pose) -> f64 {
        nalgebra::distance(&self.position, &other.position)
    }
}

/// Maps frame-local coordinates onto the drawing space.
///
/// `position = center + coordinate * scale`, componentwise. Orientation is
/// passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseTransformer {
    center: Point3<f64>,
    scale: f64,
}

impl PoseTransformer {
    pub fn new(config: &DrawConfig) -> Self {
        Self::with_parts(config.center, config.frame_scale)
    }

    pub fn with_parts(center: Point3<f64>, scale: f64) -> Self {
        Self { center, scale }
    }

    /// Builds the world pose for `coordinate` held at `orientation`.
    ///
    /// # Errors
    ///
    /// Returns [`LightPaintError::InvalidCoordinate`] when any input is NaN or
    /// infinite, or when the scaled result overflows.
    pub fn to_world_pose(&self, orientation: Orientation, coordinate: Coordinate) -> Result<Pose> {
        self.to_world_pose_in(orientation, coordinate, "pose transform")
    }

    /// Pose at the centre of the drawing space.
    pub fn center_pose(&self, orientation: Orientation) -> Result<Pose> {
        self.to_world_pose_in(orientation, Coordinate::ORIGIN, "centre pose")
    }

    pub(crate) fn to_world_pose_in(
        &self,
        orientation: Orientation,
        coordinate: Coordinate,
        context: &str,
    ) -> Result<Pose> {
        orientation.check_finite(context)?;

        let position = Point3::new(
            self.axis("x", self.center.x, coordinate.x, context)?,
            self.axis("y", self.center.y, coordinate.y, context)?,
            self.axis("z", self.center.z, coordinate.z, context)?,
        );

        Ok(Pose::new(position, orientation.to_quaternion()))
    }

    fn axis(&self, axis: &'static str, offset: f64, local: f64, context: &str) -> Result<f64> {
        if !local.is_finite() {
            return Err(LightPaintError::invalid_coordinate(axis, local, context));
        }
        let world = offset + local * self.scale;
        if !world.is_finite() {
            return Err(LightPaintError::invalid_coordinate(axis, world, context));
        }
        Ok(world)
    }
}
