use crate::{DrawConfig, Frame, FrameList, Orientation, Pose, PoseTransformer, Result};

/// Turns frames into world-frame waypoint lists at the fixed drawing
/// orientation. Pure, so whole animations can be prepared ahead of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct PathBuilder {
    transformer: PoseTransformer,
    orientation: Orientation,
}

impl PathBuilder {
    pub fn new(config: &DrawConfig) -> Self {
        Self::with_parts(PoseTransformer::new(config), config.orientation)
    }

    pub fn with_parts(transformer: PoseTransformer, orientation: Orientation) -> Self {
        Self {
            transformer,
            orientation,
        }
    }

    pub fn transformer(&self) -> &PoseTransformer {
        &self.transformer
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// One pose per point, in stroke order. An empty frame yields an empty
    /// path.
    pub fn build_path(&self, frame: &Frame) -> Result<Vec<Pose>> {
        frame
            .iter()
            .enumerate()
            .map(|(index, coordinate)| {
                self.transformer.to_world_pose_in(
                    self.orientation,
                    *coordinate,
                    &format!("point {index}"),
                )
            })
            .collect()
    }

    /// Builds every frame's path up front, failing on the first bad point.
    pub fn build_all(&self, frames: &FrameList) -> Result<Vec<Vec<Pose>>> {
        frames.iter().map(|frame| self.build_path(frame)).collect()
    }
}
