use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Frame-local point, unscaled and uncentred.
///
/// Frame files may list planar points as `[x, y]`; those are stored with an
/// explicit `z = 0.0` through [`Coordinate::planar`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCoordinate", into = "[f64; 3]")]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coordinate {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Point on the drawing plane.
    pub const fn planar(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCoordinate {
    Planar([f64; 2]),
    Spatial([f64; 3]),
}

impl From<RawCoordinate> for Coordinate {
    fn from(raw: RawCoordinate) -> Self {
        match raw {
            RawCoordinate::Planar([x, y]) => Coordinate::planar(x, y),
            RawCoordinate::Spatial([x, y, z]) => Coordinate::new(x, y, z),
        }
    }
}

impl From<Coordinate> for [f64; 3] {
    fn from(c: Coordinate) -> Self {
        [c.x, c.y, c.z]
    }
}

/// One exposure: the ordered stroke traced while the light is on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Frame {
    points: Vec<Coordinate>,
}

impl Frame {
    pub fn new(points: Vec<Coordinate>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Coordinate> {
        self.points.iter()
    }
}

impl FromIterator<Coordinate> for Frame {
    fn from_iter<I: IntoIterator<Item = Coordinate>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Frame {
    type Item = &'a Coordinate;
    type IntoIter = std::slice::Iter<'a, Coordinate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Whole animation, in playback order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameList {
    frames: Vec<Frame>,
}

impl FrameList {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    /// Parses a JSON array of frames, each an array of `[x, y]` or
    /// `[x, y, z]` points.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frame> {
        self.frames.iter()
    }

    /// Total number of points across every frame.
    pub fn point_count(&self) -> usize {
        self.frames.iter().map(Frame::len).sum()
    }
}

impl FromIterator<Frame> for FrameList {
    fn from_iter<I: IntoIterator<Item = Frame>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FrameList {
    type Item = &'a Frame;
    type IntoIter = std::slice::Iter<'a, Frame>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
