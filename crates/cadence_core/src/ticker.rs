//! Tick sources
//!
//! A tick source is the host event loop's side of the scheduler contract:
//! it arms a periodic timer when asked to and delivers a one-shot
//! zero-delay callback used to batch admissions.

use std::time::Duration;

/// Timer collaborator driven by the scheduler.
pub trait TickSource {
    /// Arm the one-shot zero-delay callback. Repeated requests before the
    /// callback runs coalesce into one.
    fn request_admission(&mut self);

    /// Consume a pending admission request, returning whether there was one.
    fn take_admission_request(&mut self) -> bool;

    /// Start (or restart) the periodic timer.
    fn start_periodic(&mut self, interval: Duration);

    /// Stop the periodic timer. Does nothing if it is not running.
    fn stop_periodic(&mut self);

    /// Interval of the periodic timer, if it is running.
    fn periodic_interval(&self) -> Option<Duration>;

    fn is_periodic_active(&self) -> bool {
        self.periodic_interval().is_some()
    }
}

/// In-process tick source that only records what was asked of it.
///
/// A frame loop polls it (directly, or through the scheduler's `pump`) and
/// invokes the scheduler callbacks accordingly.
#[derive(Debug, Default, Clone)]
pub struct FrameTicker {
    admission_requested: bool,
    periodic: Option<Duration>,
    starts: u32,
    stops: u32,
}

impl FrameTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the periodic timer was started
    pub fn start_count(&self) -> u32 {
        self.starts
    }

    /// Number of times a running periodic timer was stopped
    pub fn stop_count(&self) -> u32 {
        self.stops
    }

    pub fn admission_requested(&self) -> bool {
        self.admission_requested
    }
}

impl TickSource for FrameTicker {
    fn request_admission(&mut self) {
        self.admission_requested = true;
    }

    fn take_admission_request(&mut self) -> bool {
        std::mem::take(&mut self.admission_requested)
    }

    fn start_periodic(&mut self, interval: Duration) {
        tracing::trace!("FrameTicker: periodic timer started ({:?})", interval);
        self.periodic = Some(interval);
        self.starts += 1;
    }

    fn stop_periodic(&mut self) {
        if self.periodic.take().is_some() {
            tracing::trace!("FrameTicker: periodic timer stopped");
            self.stops += 1;
        }
    }

    fn periodic_interval(&self) -> Option<Duration> {
        self.periodic
    }
}
