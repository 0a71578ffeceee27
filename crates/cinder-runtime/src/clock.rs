//! Host frame clock and the pausable game clock

use crate::source::TimeSource;
use crate::timer::Timer;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Accumulates host-supplied frame deltas, one sample per rendered frame.
///
/// `source()` hands out a [`TimeSource`] reading the total, which is the
/// reference every other clock builds on. Deltas are taken as given unless a
/// cap is set with [`FrameClock::with_max_frame_time`]; a capped frame loses
/// the excess for good.
#[derive(Debug, Default)]
pub struct FrameClock {
    /// Total elapsed host time in seconds
    total_time: Rc<Cell<f64>>,
    /// Time since last frame in seconds
    pub delta_time: f64,
    max_frame_time: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamp every delta to `max` seconds
    pub fn with_max_frame_time(mut self, max: f64) -> Self {
        self.max_frame_time = Some(max);
        self
    }

    pub fn max_frame_time(&self) -> Option<f64> {
        self.max_frame_time
    }

    /// Advance by a host-supplied delta. Negative deltas count as zero.
    pub fn advance(&mut self, dt: f64) {
        let dt = dt.max(0.0);
        self.delta_time = match self.max_frame_time {
            Some(max) => dt.min(max),
            None => dt,
        };
        self.total_time.set(self.total_time.get() + self.delta_time);
    }

    pub fn total_time(&self) -> f64 {
        self.total_time.get()
    }

    pub fn source(&self) -> TimeSource {
        let total = Rc::clone(&self.total_time);
        TimeSource::new(move || total.get())
    }
}

/// Pausable game time layered over a host source.
///
/// Clones share state: pausing any clone freezes every timer that was built
/// on [`GameClock::source`], while timers on the host source keep running.
#[derive(Clone, Debug)]
pub struct GameClock {
    timer: Rc<RefCell<Timer>>,
}

impl GameClock {
    pub fn new(host: TimeSource) -> Self {
        Self {
            timer: Rc::new(RefCell::new(Timer::new(-1.0, host))),
        }
    }

    /// Current game time in seconds
    pub fn time(&self) -> f64 {
        self.timer.borrow().get_time()
    }

    pub fn pause(&self) {
        self.timer.borrow_mut().pause();
        log::debug!("[clock] game clock paused at {:.3}s", self.time());
    }

    pub fn unpause(&self) {
        self.timer.borrow_mut().unpause();
        log::debug!("[clock] game clock resumed at {:.3}s", self.time());
    }

    pub fn is_paused(&self) -> bool {
        self.timer.borrow().is_paused()
    }

    pub fn source(&self) -> TimeSource {
        let timer = Rc::clone(&self.timer);
        TimeSource::new(move || timer.borrow().get_time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ManualClock;

    #[test]
    fn advance_takes_long_frames_whole() {
        let mut clock = FrameClock::new();
        clock.advance(2.0);
        assert_eq!(clock.delta_time, 2.0);
        clock.advance(-1.0);
        assert_eq!(clock.delta_time, 0.0);
        assert_eq!(clock.total_time(), 2.0);
    }

    #[test]
    fn capped_clock_clamps_long_frames() {
        let mut clock = FrameClock::new().with_max_frame_time(0.25);
        clock.advance(1.0);
        assert_eq!(clock.delta_time, 0.25);
        clock.advance(0.125);
        assert_eq!(clock.delta_time, 0.125);
        assert_eq!(clock.total_time(), 0.375);
    }

    #[test]
    fn frame_source_tracks_total() {
        let mut clock = FrameClock::new();
        let source = clock.source();
        clock.advance(0.125);
        clock.advance(0.125);
        assert_eq!(source.now(), 0.25);
    }

    #[test]
    fn paused_game_clock_freezes_its_timers_only() {
        let host = ManualClock::new();
        let game = GameClock::new(host.source());

        let particle_timer = Timer::new(1.0, game.source());
        let ui_timer = Timer::new(1.0, host.source());

        host.set(0.5);
        game.pause();
        host.set(2.0);

        assert!(game.is_paused());
        assert_eq!(particle_timer.get_time(), 0.5);
        assert!(!particle_timer.is_over());
        assert!(ui_timer.is_over());

        game.unpause();
        host.set(2.5);
        assert_eq!(game.time(), 1.0);
        assert!(particle_timer.is_over());
    }
}
