use serde::{Deserialize, Serialize};

use crate::{config::LightConfig, Result};

/// Logical state of the end-effector light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightState {
    On,
    Off,
}

/// Aperture distances for the two gripper fingers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ApertureCommand {
    pub channels: [f64; 2],
}

impl ApertureCommand {
    /// Same distance on both channels.
    pub fn uniform(distance: f64) -> Self {
        Self {
            channels: [distance; 2],
        }
    }
}

/// Outbound actuator transport. Delivery is best effort and unacknowledged.
pub trait ActuatorPublisher {
    fn publish(&mut self, command: ApertureCommand) -> Result<()>;
}

impl<A: ActuatorPublisher + ?Sized> ActuatorPublisher for Box<A> {
    fn publish(&mut self, command: ApertureCommand) -> Result<()> {
        (**self).publish(command)
    }
}

/// Owns the light state and turns it into gripper commands.
#[derive(Debug)]
pub struct LightActuator<A> {
    publisher: A,
    on_distance: f64,
    off_distance: f64,
    state: Option<LightState>,
}

impl<A: ActuatorPublisher> LightActuator<A> {
    pub fn new(publisher: A, config: &LightConfig) -> Self {
        Self {
            publisher,
            on_distance: config.on_distance,
            off_distance: config.off_distance,
            state: None,
        }
    }

    /// Last state successfully handed to the transport. `None` until the
    /// first command goes out.
    pub fn state(&self) -> Option<LightState> {
        self.state
    }

    pub fn command_for(&self, state: LightState) -> ApertureCommand {
        match state {
            LightState::On => ApertureCommand::uniform(self.on_distance),
            LightState::Off => ApertureCommand::uniform(self.off_distance),
        }
    }

    /// Publishes one command for `state`. Does not wait for the gripper to
    /// reach the aperture.
    pub fn set_light(&mut self, state: LightState) -> Result<()> {
        let command = self.command_for(state);
        tracing::debug!(?state, channels = ?command.channels, "publishing light command");
        self.publisher.publish(command)?;
        self.state = Some(state);
        Ok(())
    }
}
