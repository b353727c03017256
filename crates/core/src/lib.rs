//! Core library for robot arm light painting.
//!
//! A session draws an animation one exposure at a time: the arm traces each
//! frame with a lit end effector while the camera shutter is open, the light
//! goes off, and the camera gets a fixed window to read out before the next
//! frame. Motion planning and the gripper transport are external; they plug in
//! through [`MotionPlanner`] and [`ActuatorPublisher`].

pub mod config;
pub mod error;
pub mod frames;
pub mod gesture;
pub mod light;
pub mod motion;
pub mod path;
pub mod pose;
pub mod report;
pub mod sequencer;
pub mod sim;
pub mod timing;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{DrawConfig, LightConfig, PlanningConfig, TimingConfig};
pub use error::{LightPaintError, Result};
pub use frames::{Coordinate, Frame, FrameList};
pub use gesture::ShakeGesture;
pub use light::{ActuatorPublisher, ApertureCommand, LightActuator, LightState};
pub use motion::{CartesianTolerance, MotionExecutor, MotionPlanner, PathExecution};
pub use path::PathBuilder;
pub use pose::{Orientation, Pose, PoseTransformer};
pub use report::{FrameOutcome, FrameReport, RunReport};
pub use sequencer::{FrameSequencer, SequencerState};
pub use sim::{LoggingGripper, SimulatedArm};
pub use timing::{ShutterCue, ShutterEvent, Sleeper, ThreadSleeper, TracingCue, VirtualClock};
