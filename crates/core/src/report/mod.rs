use serde::{Deserialize, Serialize};

/// What happened to one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FrameOutcome {
    /// Whole stroke planned and executed.
    Drawn,
    /// Stroke executed but only part of it could be planned.
    Partial { coverage: f64 },
    /// Stroke abandoned. Light-off and the processing wait still ran.
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub index: usize,
    pub waypoints: usize,
    #[serde(flatten)]
    pub outcome: FrameOutcome,
    /// Set when a light command could not be dispatched.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub light_faults: Vec<String>,
}

/// Summary of a whole session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub homed: bool,
    pub frames: Vec<FrameReport>,
    /// Moves completed by the completion gesture, if one was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledgement_moves: Option<usize>,
}

impl RunReport {
    pub fn drawn(&self) -> usize {
        self.count(|outcome| matches!(outcome, FrameOutcome::Drawn))
    }

    pub fn partial(&self) -> usize {
        self.count(|outcome| matches!(outcome, FrameOutcome::Partial { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, FrameOutcome::Skipped { .. }))
    }

    /// True when every frame was fully drawn after a successful homing move.
    pub fn is_clean(&self) -> bool {
        self.homed
            && self.drawn() == self.frames.len()
            && self.frames.iter().all(|frame| frame.light_faults.is_empty())
    }

    pub fn to_json_pretty(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn count(&self, predicate: impl Fn(&FrameOutcome) -> bool) -> usize {
        self.frames
            .iter()
            .filter(|frame| predicate(&frame.outcome))
            .count()
    }
}
