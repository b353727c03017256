//! Exposure timing: fixed waits and the shutter markers shown to the
//! camera operator.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Blocking wait used for the settle and processing windows.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

impl<S: Sleeper + ?Sized> Sleeper for Box<S> {
    fn sleep(&mut self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Suspends the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Advances a virtual clock instead of blocking.
#[derive(Debug, Default, Clone)]
pub struct VirtualClock {
    elapsed: Duration,
    waits: usize,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn waits(&self) -> usize {
        self.waits
    }
}

impl Sleeper for VirtualClock {
    fn sleep(&mut self, duration: Duration) {
        self.elapsed = self.elapsed.saturating_add(duration);
        self.waits += 1;
    }
}

/// Shutter marker for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShutterEvent {
    Open,
    Closed,
}

impl ShutterEvent {
    pub fn label(&self) -> &'static str {
        match self {
            ShutterEvent::Open => "Open Shutter",
            ShutterEvent::Closed => "Close Shutter",
        }
    }
}

/// Receives the informational shutter markers around each drawing phase.
pub trait ShutterCue {
    fn announce(&mut self, frame: usize, event: ShutterEvent);
}

impl<C: ShutterCue + ?Sized> ShutterCue for Box<C> {
    fn announce(&mut self, frame: usize, event: ShutterEvent) {
        (**self).announce(frame, event)
    }
}

/// Writes shutter markers to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingCue;

impl ShutterCue for TracingCue {
    fn announce(&mut self, frame: usize, event: ShutterEvent) {
        tracing::info!(frame, "{}", event.label());
    }
}
