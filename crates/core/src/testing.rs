//! Recording fakes that write every collaborator call into one ordered log.

use std::{cell::RefCell, collections::VecDeque, rc::Rc, time::Duration};

use nalgebra::Point3;

use crate::{
    ActuatorPublisher, ApertureCommand, CartesianTolerance, LightPaintError, MotionPlanner, Pose,
    Result, ShutterCue, ShutterEvent, Sleeper,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Pose(Pose),
    Path {
        positions: Vec<Point3<f64>>,
        eef_step: f64,
        jump_threshold: f64,
    },
    Aperture([f64; 2]),
    Sleep(Duration),
    Shutter(usize, ShutterEvent),
}

#[derive(Debug, Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<Event>>>);

impl EventLog {
    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }
}

#[derive(Debug)]
pub struct RecordingPlanner {
    log: EventLog,
    pose_results: VecDeque<Result<()>>,
    path_results: VecDeque<Result<f64>>,
}

impl RecordingPlanner {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            pose_results: VecDeque::new(),
            path_results: VecDeque::new(),
        }
    }

    /// Results handed out by successive `go_to_pose` calls; success once
    /// exhausted.
    pub fn with_pose_results(mut self, results: Vec<Result<()>>) -> Self {
        self.pose_results = results.into();
        self
    }

    /// Results handed out by successive path calls; full coverage once
    /// exhausted.
    pub fn with_path_results(mut self, results: Vec<Result<f64>>) -> Self {
        self.path_results = results.into();
        self
    }
}

impl MotionPlanner for RecordingPlanner {
    fn go_to_pose(&mut self, pose: &Pose) -> Result<()> {
        self.log.push(Event::Pose(*pose));
        self.pose_results.pop_front().unwrap_or(Ok(()))
    }

    fn follow_cartesian_path(
        &mut self,
        waypoints: &[Pose],
        tolerance: &CartesianTolerance,
    ) -> Result<f64> {
        self.log.push(Event::Path {
            positions: waypoints.iter().map(|pose| pose.position).collect(),
            eef_step: tolerance.eef_step,
            jump_threshold: tolerance.jump_threshold,
        });
        self.path_results.pop_front().unwrap_or(Ok(1.0))
    }
}

#[derive(Debug)]
pub struct RecordingPublisher {
    log: EventLog,
    fail_after: Option<usize>,
    sent: usize,
}

impl RecordingPublisher {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            fail_after: None,
            sent: 0,
        }
    }

    /// Accepts `count` commands, then rejects every following one.
    pub fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }
}

impl ActuatorPublisher for RecordingPublisher {
    fn publish(&mut self, command: ApertureCommand) -> Result<()> {
        if self.fail_after.is_some_and(|limit| self.sent >= limit) {
            return Err(LightPaintError::actuator("transport closed"));
        }
        self.sent += 1;
        self.log.push(Event::Aperture(command.channels));
        Ok(())
    }
}

#[derive(Debug)]
pub struct RecordingSleeper(pub EventLog);

impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, duration: Duration) {
        self.0.push(Event::Sleep(duration));
    }
}

#[derive(Debug)]
pub struct RecordingCue(pub EventLog);

impl ShutterCue for RecordingCue {
    fn announce(&mut self, frame: usize, event: ShutterEvent) {
        self.0.push(Event::Shutter(frame, event));
    }
}
