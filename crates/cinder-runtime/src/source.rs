//! Injectable time sources

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// A function returning the current time in seconds.
///
/// Sources are cheap to clone and shared by every timer drawing from them,
/// which is what lets one paused game clock freeze particles and projectiles
/// while UI timers on the host clock keep running.
#[derive(Clone)]
pub struct TimeSource(Rc<dyn Fn() -> f64>);

impl TimeSource {
    pub fn new(f: impl Fn() -> f64 + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// A source that never advances
    pub fn fixed(value: f64) -> Self {
        Self::new(move || value)
    }

    /// Current sample in seconds
    pub fn now(&self) -> f64 {
        (self.0)()
    }
}

impl fmt::Debug for TimeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeSource(now={})", self.now())
    }
}

/// Hand-driven clock. Clones share the same underlying time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(t: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(t)),
        }
    }

    pub fn now(&self) -> f64 {
        self.now.get()
    }

    pub fn set(&self, t: f64) {
        self.now.set(t);
    }

    pub fn advance(&self, dt: f64) {
        self.now.set(self.now.get() + dt);
    }

    pub fn source(&self) -> TimeSource {
        let now = Rc::clone(&self.now);
        TimeSource::new(move || now.get())
    }
}
