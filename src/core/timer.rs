//! # Request Timer
//!
//! Tracks wall-clock time for the single in-flight question. The adapter calls
//! [`TimerService::tick`] from its event loop; whenever a cadence boundary has
//! passed the timer recomputes the live display value ("3.4s").
//!
//! Time comes from an injected [`Clock`] so the controller can be driven
//! deterministically in tests.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};

/// Default sampling cadence for the live display.
pub const DEFAULT_CADENCE: Duration = Duration::from_millis(100);

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Monotonic system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionHandle(u64);

/// Measured duration of one exchange. Displays with one decimal and unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed(Duration);

impl Elapsed {
    /// Seconds rounded to one decimal place.
    pub fn seconds(self) -> f64 {
        (self.0.as_secs_f64() * 10.0).round() / 10.0
    }
}

impl From<Duration> for Elapsed {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}s", self.seconds())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum TimerError {
    /// `stop` was called with no session running.
    NotRunning,
    /// `stop` was called with a handle from an earlier session.
    StaleHandle,
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerError::NotRunning => write!(f, "no timer session is running"),
            TimerError::StaleHandle => write!(f, "timer handle does not match the running session"),
        }
    }
}

impl std::error::Error for TimerError {}

#[derive(Debug)]
struct TimerSession {
    handle: SessionHandle,
    started: Instant,
    next_sample: Instant,
    display: String,
}

pub struct TimerService {
    clock: Arc<dyn Clock>,
    cadence: Duration,
    session: Option<TimerSession>,
    next_handle: u64,
}

impl TimerService {
    pub fn new(clock: Arc<dyn Clock>, cadence: Duration) -> Self {
        Self {
            clock,
            cadence: cadence.max(Duration::from_millis(1)),
            session: None,
            next_handle: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Live display value of the running session.
    pub fn display(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.display.as_str())
    }

    pub fn start(&mut self) -> SessionHandle {
        if let Some(old) = self.session.take() {
            warn!("Timer started while session {:?} was running; cancelling it", old.handle);
        }
        self.next_handle += 1;
        let handle = SessionHandle(self.next_handle);
        let now = self.clock.now();
        self.session = Some(TimerSession {
            handle,
            started: now,
            next_sample: now + self.cadence,
            display: Elapsed(Duration::ZERO).to_string(),
        });
        debug!("Timer session {:?} started", handle);
        handle
    }

    /// Samples the clock if a cadence boundary has passed. Returns the new
    /// display value when it was recomputed.
    pub fn tick(&mut self) -> Option<&str> {
        let now = self.clock.now();
        let cadence = self.cadence;
        let session = self.session.as_mut()?;
        if now < session.next_sample {
            return None;
        }
        // Skip boundaries missed while the loop was busy
        while session.next_sample <= now {
            session.next_sample += cadence;
        }
        session.display = Elapsed(now - session.started).to_string();
        Some(session.display.as_str())
    }

    /// Ends the session and returns its elapsed time. The session is torn
    /// down on every path, including the error ones.
    pub fn stop(&mut self, handle: SessionHandle) -> Result<Elapsed, TimerError> {
        let session = self.session.take().ok_or(TimerError::NotRunning)?;
        if session.handle != handle {
            warn!(
                "Timer stop with handle {:?} but session {:?} was running",
                handle, session.handle
            );
            return Err(TimerError::StaleHandle);
        }
        let elapsed = Elapsed(self.clock.now().saturating_duration_since(session.started));
        debug!("Timer session {:?} stopped after {}", handle, elapsed);
        Ok(elapsed)
    }
}

impl fmt::Debug for TimerService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerService")
            .field("cadence", &self.cadence)
            .field("session", &self.session)
            .finish()
    }
}
