//! Frame-by-frame session driver.
//!
//! Each frame runs strictly in order: shutter cue, light on, settle wait,
//! stroke, light off, shutter cue, processing wait. Failures stay inside the
//! frame they happened in; the session always runs to the last frame.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    ActuatorPublisher, CartesianTolerance, DrawConfig, Frame, FrameList, FrameOutcome,
    FrameReport, LightActuator, LightState, MotionExecutor, MotionPlanner, PathBuilder, Result,
    RunReport, ShakeGesture, ShutterCue, ShutterEvent, Sleeper, TracingCue,
};

/// Where the sequencer currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequencerState {
    Idle,
    Homing,
    LightingOn { frame: usize },
    Drawing { frame: usize },
    LightingOff { frame: usize },
    Processing { frame: usize },
    Acknowledging,
    Done,
}

pub struct FrameSequencer<P, A, S> {
    builder: PathBuilder,
    gesture: ShakeGesture,
    motion: MotionExecutor<P>,
    light: LightActuator<A>,
    sleeper: S,
    cue: Box<dyn ShutterCue>,
    settle: Duration,
    processing: Duration,
    completion_shakes: u32,
    state: SequencerState,
}

impl<P, A, S> FrameSequencer<P, A, S>
where
    P: MotionPlanner,
    A: ActuatorPublisher,
    S: Sleeper,
{
    /// Wires the collaborators against a validated configuration.
    pub fn new(config: &DrawConfig, planner: P, publisher: A, sleeper: S) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            builder: PathBuilder::new(config),
            gesture: ShakeGesture::new(config),
            motion: MotionExecutor::new(planner, CartesianTolerance::from(&config.planning)),
            light: LightActuator::new(publisher, &config.light),
            sleeper,
            cue: Box::new(TracingCue),
            settle: config.timing.settle_delay(),
            processing: config.timing.processing_delay(),
            completion_shakes: config.completion_shakes,
            state: SequencerState::Idle,
        })
    }

    /// Replaces the default log-based shutter markers.
    pub fn with_cue(mut self, cue: impl ShutterCue + 'static) -> Self {
        self.cue = Box::new(cue);
        self
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn light_state(&self) -> Option<LightState> {
        self.light.state()
    }

    pub fn motion(&self) -> &MotionExecutor<P> {
        &self.motion
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Moves to the centre of the drawing space at the drawing orientation.
    pub fn home(&mut self) -> Result<()> {
        let pose = self
            .builder
            .transformer()
            .center_pose(self.builder.orientation())?;
        tracing::info!(position = ?pose.position, "homing");
        self.motion.move_to_single_pose(&pose)
    }

    /// Operator acknowledgement gesture.
    pub fn shake(&mut self, count: i64) -> Result<usize> {
        self.gesture.shake(&mut self.motion, count)
    }

    /// Draws every frame in order and returns what happened to each.
    ///
    /// A homing failure is logged and the frames are drawn anyway.
    pub fn run(&mut self, frames: &FrameList) -> RunReport {
        tracing::info!(
            frames = frames.len(),
            points = frames.point_count(),
            "starting light painting session"
        );

        self.state = SequencerState::Homing;
        let homed = match self.home() {
            Ok(()) => true,
            Err(err) => {
                tracing::error!(%err, "homing failed, every frame will start from an unknown pose");
                false
            }
        };

        let mut report = RunReport {
            homed,
            ..RunReport::default()
        };

        for (index, frame) in frames.iter().enumerate() {
            report.frames.push(self.draw_frame(index, frame));
        }

        if self.completion_shakes > 0 {
            self.state = SequencerState::Acknowledging;
            match self.shake(i64::from(self.completion_shakes)) {
                Ok(moves) => report.acknowledgement_moves = Some(moves),
                Err(err) => tracing::warn!(%err, "completion gesture failed"),
            }
        }

        self.state = SequencerState::Done;
        tracing::info!(
            drawn = report.drawn(),
            partial = report.partial(),
            skipped = report.skipped(),
            "session complete"
        );
        report
    }

    fn draw_frame(&mut self, index: usize, frame: &Frame) -> FrameReport {
        let span = tracing::info_span!("frame", index);
        let _guard = span.enter();
        let mut light_faults = Vec::new();

        self.cue.announce(index, ShutterEvent::Open);
        self.state = SequencerState::LightingOn { frame: index };
        self.switch_light(LightState::On, &mut light_faults);
        self.sleeper.sleep(self.settle);

        self.state = SequencerState::Drawing { frame: index };
        let outcome = match self.builder.build_path(frame) {
            Ok(path) => match self.motion.execute_path(&path) {
                Ok(execution) if execution.is_partial() => FrameOutcome::Partial {
                    coverage: execution.coverage,
                },
                Ok(_) => FrameOutcome::Drawn,
                Err(err) => {
                    tracing::error!(%err, "stroke failed, frame abandoned");
                    FrameOutcome::Skipped {
                        reason: err.to_string(),
                    }
                }
            },
            Err(err) => {
                tracing::error!(%err, "frame rejected before motion");
                FrameOutcome::Skipped {
                    reason: err.to_string(),
                }
            }
        };

        self.state = SequencerState::LightingOff { frame: index };
        self.switch_light(LightState::Off, &mut light_faults);
        self.cue.announce(index, ShutterEvent::Closed);

        self.state = SequencerState::Processing { frame: index };
        self.sleeper.sleep(self.processing);

        FrameReport {
            index,
            waypoints: frame.len(),
            outcome,
            light_faults,
        }
    }

    fn switch_light(&mut self, state: LightState, faults: &mut Vec<String>) {
        if let Err(err) = self.light.set_light(state) {
            tracing::error!(%err, ?state, "light command not dispatched");
            faults.push(err.to_string());
        }
    }
}

impl<P, A, S> fmt::Debug for FrameSequencer<P, A, S>
where
    P: MotionPlanner,
    A: ActuatorPublisher,
    S: Sleeper,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameSequencer")
            .field("state", &self.state)
            .field("light", &self.light.state())
            .field("settle", &self.settle)
            .field("processing", &self.processing)
            .field("completion_shakes", &self.completion_shakes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use super::*;
    use crate::{
        testing::{
            Event, EventLog, RecordingCue, RecordingPlanner, RecordingPublisher, RecordingSleeper,
        },
        Coordinate, LightPaintError,
    };

    const ON: Event = Event::Aperture([0.03, 0.03]);
    const OFF: Event = Event::Aperture([0.05, 0.05]);

    type TestSequencer = FrameSequencer<RecordingPlanner, RecordingPublisher, RecordingSleeper>;

    fn sequencer(config: &DrawConfig, log: &EventLog, planner: RecordingPlanner) -> TestSequencer {
        FrameSequencer::new(
            config,
            planner,
            RecordingPublisher::new(log.clone()),
            RecordingSleeper(log.clone()),
        )
        .unwrap()
        .with_cue(RecordingCue(log.clone()))
    }

    fn frames(frames: Vec<Vec<Coordinate>>) -> FrameList {
        frames.into_iter().map(Frame::new).collect()
    }

    fn settle() -> Event {
        Event::Sleep(Duration::from_secs(1))
    }

    fn processing() -> Event {
        Event::Sleep(Duration::from_secs(20))
    }

    fn path(positions: Vec<Point3<f64>>) -> Event {
        Event::Path {
            positions,
            eef_step: 0.01,
            jump_threshold: 0.0,
        }
    }

    #[test]
    fn single_frame_runs_in_exposure_order() {
        let log = EventLog::default();
        let config = DrawConfig::default();
        let mut seq = sequencer(&config, &log, RecordingPlanner::new(log.clone()));

        let report = seq.run(&frames(vec![vec![Coordinate::new(0.0, 0.0, 0.0)]]));

        let events = log.events();
        assert!(matches!(events[0], Event::Pose(p) if p.position == Point3::new(0.5, 0.0, 0.5)));
        assert_eq!(
            events[1..].to_vec(),
            vec![
                Event::Shutter(0, ShutterEvent::Open),
                ON,
                settle(),
                path(vec![Point3::new(0.5, 0.0, 0.5)]),
                OFF,
                Event::Shutter(0, ShutterEvent::Closed),
                processing(),
            ]
        );
        assert!(report.is_clean());
        assert_eq!(seq.state(), SequencerState::Done);
        assert_eq!(seq.light_state(), Some(LightState::Off));
    }

    #[test]
    fn failed_stroke_still_closes_out_the_frame() {
        let log = EventLog::default();
        let planner = RecordingPlanner::new(log.clone())
            .with_path_results(vec![Err(LightPaintError::motion("no IK solution")), Ok(1.0)]);
        let mut seq = sequencer(&DrawConfig::default(), &log, planner);

        let report = seq.run(&frames(vec![
            vec![Coordinate::planar(10.0, 0.0)],
            vec![Coordinate::planar(0.0, 10.0)],
        ]));

        let events = log.events();
        assert_eq!(
            events[1..].to_vec(),
            vec![
                Event::Shutter(0, ShutterEvent::Open),
                ON,
                settle(),
                path(vec![Point3::new(0.5 + 10.0 * 0.004, 0.0, 0.5)]),
                OFF,
                Event::Shutter(0, ShutterEvent::Closed),
                processing(),
                Event::Shutter(1, ShutterEvent::Open),
                ON,
                settle(),
                path(vec![Point3::new(0.5, 10.0 * 0.004, 0.5)]),
                OFF,
                Event::Shutter(1, ShutterEvent::Closed),
                processing(),
            ]
        );

        assert!(matches!(
            report.frames[0].outcome,
            FrameOutcome::Skipped { ref reason } if reason.contains("no IK solution")
        ));
        assert_eq!(report.frames[1].outcome, FrameOutcome::Drawn);
        assert_eq!(report.skipped(), 1);
    }

    #[test]
    fn homing_failure_does_not_abort_the_run() {
        let log = EventLog::default();
        let planner = RecordingPlanner::new(log.clone())
            .with_pose_results(vec![Err(LightPaintError::motion("start state in collision"))]);
        let mut seq = sequencer(&DrawConfig::default(), &log, planner);

        let report = seq.run(&frames(vec![vec![Coordinate::ORIGIN]]));

        assert!(!report.homed);
        assert_eq!(report.drawn(), 1);
        assert!(log.events().iter().any(|e| matches!(e, Event::Path { .. })));
    }

    #[test]
    fn empty_frame_still_gets_a_full_exposure_window() {
        let log = EventLog::default();
        let mut seq = sequencer(&DrawConfig::default(), &log, RecordingPlanner::new(log.clone()));

        let report = seq.run(&frames(vec![vec![]]));

        assert_eq!(
            log.events()[1..].to_vec(),
            vec![
                Event::Shutter(0, ShutterEvent::Open),
                ON,
                settle(),
                OFF,
                Event::Shutter(0, ShutterEvent::Closed),
                processing(),
            ]
        );
        assert_eq!(report.frames[0].outcome, FrameOutcome::Drawn);
        assert_eq!(report.frames[0].waypoints, 0);
    }

    #[test]
    fn invalid_coordinates_never_reach_the_planner() {
        let log = EventLog::default();
        let mut seq = sequencer(&DrawConfig::default(), &log, RecordingPlanner::new(log.clone()));

        let report = seq.run(&frames(vec![
            vec![Coordinate::ORIGIN, Coordinate::planar(f64::INFINITY, 0.0)],
            vec![Coordinate::ORIGIN],
        ]));

        let paths = log
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::Path { .. }))
            .count();
        assert_eq!(paths, 1);
        assert!(matches!(report.frames[0].outcome, FrameOutcome::Skipped { .. }));
        assert_eq!(report.frames[1].outcome, FrameOutcome::Drawn);
        assert_eq!(seq.light_state(), Some(LightState::Off));
    }

    #[test]
    fn partial_coverage_is_reported_not_failed() {
        let log = EventLog::default();
        let planner = RecordingPlanner::new(log.clone()).with_path_results(vec![Ok(0.75)]);
        let mut seq = sequencer(&DrawConfig::default(), &log, planner);

        let report = seq.run(&frames(vec![vec![
            Coordinate::ORIGIN,
            Coordinate::planar(1.0, 1.0),
        ]]));

        assert_eq!(report.frames[0].outcome, FrameOutcome::Partial { coverage: 0.75 });
        assert_eq!(report.partial(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn light_is_toggled_exactly_twice_around_each_stroke() {
        let log = EventLog::default();
        let mut seq = sequencer(&DrawConfig::default(), &log, RecordingPlanner::new(log.clone()));

        seq.run(&frames(vec![
            vec![Coordinate::ORIGIN],
            vec![Coordinate::planar(1.0, 0.0)],
            vec![Coordinate::planar(2.0, 0.0)],
        ]));

        let relevant: Vec<Event> = log
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::Aperture(_) | Event::Path { .. } | Event::Sleep(_)))
            .collect();

        for chunk in relevant.chunks(5) {
            assert_eq!(chunk[0], ON);
            assert_eq!(chunk[1], settle());
            assert!(matches!(chunk[2], Event::Path { .. }));
            assert_eq!(chunk[3], OFF);
            assert_eq!(chunk[4], processing());
        }
        assert_eq!(relevant.len(), 15);
    }

    #[test]
    fn light_faults_are_recorded_and_the_stroke_continues() {
        let log = EventLog::default();
        let mut seq = FrameSequencer::new(
            &DrawConfig::default(),
            RecordingPlanner::new(log.clone()),
            RecordingPublisher::new(log.clone()).failing_after(1),
            RecordingSleeper(log.clone()),
        )
        .unwrap()
        .with_cue(RecordingCue(log.clone()));

        let report = seq.run(&frames(vec![vec![Coordinate::ORIGIN]]));

        assert_eq!(report.frames[0].outcome, FrameOutcome::Drawn);
        assert_eq!(report.frames[0].light_faults.len(), 1);
        assert_eq!(seq.light_state(), Some(LightState::On));
        assert!(!report.is_clean());
    }

    #[test]
    fn configured_delays_are_honoured() {
        let log = EventLog::default();
        let mut config = DrawConfig::default();
        config.timing.settle_seconds = 0.25;
        config.timing.processing_seconds = 3.0;
        let mut seq = sequencer(&config, &log, RecordingPlanner::new(log.clone()));

        seq.run(&frames(vec![vec![Coordinate::ORIGIN], vec![Coordinate::ORIGIN]]));

        let sleeps: Vec<Event> = log
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::Sleep(_)))
            .collect();
        assert_eq!(
            sleeps,
            vec![
                Event::Sleep(Duration::from_millis(250)),
                Event::Sleep(Duration::from_secs(3)),
                Event::Sleep(Duration::from_millis(250)),
                Event::Sleep(Duration::from_secs(3)),
            ]
        );
    }

    #[test]
    fn completion_shakes_follow_the_last_frame() {
        let log = EventLog::default();
        let mut config = DrawConfig::default();
        config.completion_shakes = 1;
        let mut seq = sequencer(&config, &log, RecordingPlanner::new(log.clone()));

        let report = seq.run(&frames(vec![vec![Coordinate::ORIGIN]]));

        let events = log.events();
        let tail = &events[events.len() - 3..];
        assert!(tail.iter().all(|e| matches!(e, Event::Pose(_))));
        assert_eq!(events[events.len() - 4], processing());
        assert_eq!(report.acknowledgement_moves, Some(3));
    }

    #[test]
    fn rejects_invalid_configuration() {
        let log = EventLog::default();
        let config = DrawConfig {
            frame_scale: 0.0,
            ..DrawConfig::default()
        };
        let result = FrameSequencer::new(
            &config,
            RecordingPlanner::new(log.clone()),
            RecordingPublisher::new(log.clone()),
            RecordingSleeper(log),
        );
        assert!(matches!(result, Err(LightPaintError::Config(_))));
    }
}
