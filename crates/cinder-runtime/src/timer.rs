//! Pausable, rescalable timer built on an injected time source

use crate::source::TimeSource;
use cinder_core::{CinderError, Result};

/// Measures elapsed time against a [`TimeSource`].
///
/// - `get_time()` is the time since the last restart, multiplied by `scale`,
///   minus any time spent paused. It never decreases while running and is
///   constant while paused.
/// - A negative `duration` means the timer never expires.
#[derive(Clone, Debug)]
pub struct Timer {
    /// Source sample at the last restart
    start_time: f64,
    /// Seconds until `is_over()` (negative: never)
    pub duration: f64,
    /// Source sample at the moment of pausing
    paused_at: Option<f64>,
    /// Raw source seconds spent paused since the last restart
    paused_accumulated: f64,
    scale: f64,
    source: TimeSource,
}

impl Timer {
    /// Create a timer with unit scale, started now
    pub fn new(duration: f64, source: TimeSource) -> Self {
        Self::with_scale(duration, source, 1.0)
    }

    /// Create a timer whose elapsed time runs `scale` times faster than its source
    pub fn with_scale(duration: f64, source: TimeSource, scale: f64) -> Self {
        let start_time = source.now();
        Self {
            start_time,
            duration,
            paused_at: None,
            paused_accumulated: 0.0,
            scale,
            source,
        }
    }

    /// Like [`Timer::with_scale`], but rejects a negative or non-finite duration
    /// and a non-positive scale.
    ///
    /// Use this at boundaries where "never expires" is not an intended value.
    pub fn try_with_duration(duration: f64, source: TimeSource, scale: f64) -> Result<Self> {
        check_duration(duration)?;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(CinderError::TimerMisuse(format!(
                "scale must be positive and finite, got {scale}"
            )));
        }
        Ok(Self::with_scale(duration, source, scale))
    }

    /// Elapsed scaled seconds since the last restart, excluding paused time
    pub fn get_time(&self) -> f64 {
        let now = self.paused_at.unwrap_or_else(|| self.source.now());
        (now - self.start_time - self.paused_accumulated) * self.scale
    }

    /// True once `get_time()` reaches a non-negative duration
    pub fn is_over(&self) -> bool {
        self.duration >= 0.0 && self.get_time() >= self.duration
    }

    /// Reset elapsed time to zero. A paused timer stays paused (at zero).
    pub fn restart(&mut self) {
        let now = self.source.now();
        self.start_time = now;
        self.paused_accumulated = 0.0;
        if self.paused_at.is_some() {
            self.paused_at = Some(now);
        }
    }

    pub fn pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(self.source.now());
        }
    }

    pub fn unpause(&mut self) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_accumulated += self.source.now() - paused_at;
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn set_duration(&mut self, duration: f64, restart: bool) {
        self.duration = duration;
        if restart {
            self.restart();
        }
    }

    /// [`Timer::set_duration`] that refuses negative or non-finite durations
    pub fn checked_set_duration(&mut self, duration: f64, restart: bool) -> Result<()> {
        check_duration(duration)?;
        self.set_duration(duration, restart);
        Ok(())
    }

    /// Move the reference point back so `get_time()` grows by `scaled_seconds`.
    ///
    /// Used to carry cooldown overshoot into the next period.
    pub fn rewind(&mut self, scaled_seconds: f64) {
        self.start_time -= scaled_seconds / self.scale;
    }

    /// Scaled seconds left before expiry, clamped at zero. `None` when the timer never expires.
    pub fn remaining(&self) -> Option<f64> {
        if self.duration < 0.0 {
            None
        } else {
            Some((self.duration - self.get_time()).max(0.0))
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn source(&self) -> &TimeSource {
        &self.source
    }
}

fn check_duration(duration: f64) -> Result<()> {
    if !duration.is_finite() || duration < 0.0 {
        return Err(CinderError::TimerMisuse(format!(
            "duration must be finite and non-negative, got {duration}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ManualClock;

    #[test]
    fn expires_exactly_at_duration() {
        let clock = ManualClock::new();
        let timer = Timer::new(5.0, clock.source());

        clock.set(4.99);
        assert!(!timer.is_over());
        clock.set(5.0);
        assert!(timer.is_over());
    }

    #[test]
    fn negative_duration_never_expires() {
        let clock = ManualClock::new();
        let timer = Timer::new(-1.0, clock.source());
        clock.set(1.0e9);
        assert!(!timer.is_over());
        assert_eq!(timer.remaining(), None);
    }

    #[test]
    fn pause_freezes_elapsed_time() {
        let clock = ManualClock::new();
        let mut timer = Timer::new(10.0, clock.source());

        clock.set(3.0);
        timer.pause();
        assert_eq!(timer.get_time(), 3.0);

        clock.set(7.0);
        assert_eq!(timer.get_time(), 3.0);
        clock.set(100.0);
        assert_eq!(timer.get_time(), 3.0);

        timer.unpause();
        assert_eq!(timer.get_time(), 3.0);
        clock.set(101.0);
        assert_eq!(timer.get_time(), 4.0);
    }

    #[test]
    fn pause_is_idempotent() {
        let clock = ManualClock::new();
        let mut timer = Timer::new(10.0, clock.source());
        clock.set(1.0);
        timer.pause();
        clock.set(2.0);
        timer.pause();
        timer.unpause();
        timer.unpause();
        assert_eq!(timer.get_time(), 1.0);
    }

    #[test]
    fn restart_keeps_pause_state() {
        let clock = ManualClock::new();
        let mut timer = Timer::new(10.0, clock.source());
        clock.set(2.0);
        timer.pause();
        timer.restart();
        assert!(timer.is_paused());
        assert_eq!(timer.get_time(), 0.0);

        clock.set(5.0);
        assert_eq!(timer.get_time(), 0.0);
        timer.unpause();
        clock.set(6.0);
        assert_eq!(timer.get_time(), 1.0);
    }

    #[test]
    fn restart_clears_elapsed() {
        let clock = ManualClock::new();
        let mut timer = Timer::new(1.0, clock.source());
        clock.set(1.5);
        assert!(timer.is_over());
        timer.restart();
        assert_eq!(timer.get_time(), 0.0);
        assert!(!timer.is_over());
    }

    #[test]
    fn scale_multiplies_elapsed() {
        let clock = ManualClock::new();
        let mut timer = Timer::with_scale(1.0, clock.source(), 2.0);
        clock.set(0.5);
        assert!((timer.get_time() - 1.0).abs() < 1e-12);
        assert!(timer.is_over());

        timer.restart();
        timer.rewind(0.5);
        assert!((timer.get_time() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn set_duration_with_restart() {
        let clock = ManualClock::new();
        let mut timer = Timer::new(5.0, clock.source());
        clock.set(5.0);
        timer.set_duration(3.0, true);
        assert!(!timer.is_over());
        clock.set(8.0);
        assert!(timer.is_over());
    }

    #[test]
    fn checked_constructors_reject_misuse() {
        let clock = ManualClock::new();
        assert!(Timer::try_with_duration(-1.0, clock.source(), 1.0).is_err());
        assert!(Timer::try_with_duration(f64::NAN, clock.source(), 1.0).is_err());
        assert!(Timer::try_with_duration(1.0, clock.source(), 0.0).is_err());
        assert!(Timer::try_with_duration(1.0, clock.source(), 1.0).is_ok());

        let mut timer = Timer::new(1.0, clock.source());
        let err = timer.checked_set_duration(-2.0, false).unwrap_err();
        assert!(matches!(err, CinderError::TimerMisuse(_)));
        assert_eq!(timer.duration, 1.0);
    }

    #[test]
    fn remaining_counts_down() {
        let clock = ManualClock::new();
        let timer = Timer::new(2.0, clock.source());
        clock.set(0.5);
        assert_eq!(timer.remaining(), Some(1.5));
        clock.set(3.0);
        assert_eq!(timer.remaining(), Some(0.0));
    }
}
