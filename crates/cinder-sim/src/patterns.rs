//! Built-in attack patterns

use crate::projectile::{Projectile, ProjectileSpawn};
use cinder_core::{lerp, rotate_deg, Rect, Vec2};
use cinder_pool::PoolRegistry;
use cinder_runtime::{TimeSource, Timer};
use cinder_script::{ExposedValue, Resume, ScriptBody};

/// Value a finished pattern reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternOutcome {
    Done { volleys: u32 },
}

/// Tuning for [`RadialSweep`]
#[derive(Debug, Clone, PartialEq)]
pub struct SweepSettings {
    /// Point the emitter circles around
    pub center: Vec2,
    pub radius: f32,
    pub projectile_speed: f32,
    /// Length of the firing phase; the emitter makes one full turn
    pub sweep_duration: f64,
    pub fire_interval: f64,
    /// Quiet period after firing stops
    pub settle_duration: f64,
    pub bounds: Rect,
}

impl SweepSettings {
    pub fn for_bounds(bounds: Rect) -> Self {
        Self {
            center: bounds.center(),
            bounds,
            ..Default::default()
        }
    }
}

impl Default for SweepSettings {
    fn default() -> Self {
        let bounds = Rect::new(0.0, 0.0, 960.0, 540.0);
        Self {
            center: bounds.center(),
            radius: 270.0,
            projectile_speed: 10.0,
            sweep_duration: 5.0,
            fire_interval: 0.1,
            settle_duration: 3.0,
            bounds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SweepPhase {
    Unstarted,
    Sweeping,
    Settling,
    Finished,
}

/// Fires projectiles from a point rotating around the center, then waits.
///
/// The angle grows linearly from 0 to 360 degrees over the sweep; each shot
/// starts `radius` above the center (rotated by the angle) and drifts along
/// the same direction.
#[derive(Debug)]
pub struct RadialSweep {
    settings: SweepSettings,
    phase: SweepPhase,
    timer: Option<Timer>,
    cooldown: Option<Timer>,
    curr_angle: f32,
    volleys: u32,
    time_source: Option<TimeSource>,
}

impl RadialSweep {
    pub fn new(settings: SweepSettings) -> Self {
        Self {
            settings,
            phase: SweepPhase::Unstarted,
            timer: None,
            cooldown: None,
            curr_angle: 0.0,
            volleys: 0,
            time_source: None,
        }
    }

    pub fn settings(&self) -> &SweepSettings {
        &self.settings
    }

    fn fire(&mut self, pools: &mut PoolRegistry) {
        let Some(source) = self.time_source.clone() else {
            return;
        };
        let s = &self.settings;
        let position = s.center + rotate_deg(Vec2::new(0.0, -s.radius), -self.curr_angle);
        let velocity = rotate_deg(Vec2::new(0.0, s.projectile_speed), -self.curr_angle);
        let spawn = ProjectileSpawn::new(position, source, s.bounds).with_velocity(velocity);
        match pools.spawn::<Projectile>(spawn) {
            Ok(_) => self.volleys += 1,
            Err(e) => log::warn!("[pattern] RadialSweep dropped a shot: {e}"),
        }
    }
}

impl ScriptBody for RadialSweep {
    type Args = TimeSource;
    type Input = ();
    type Output = PatternOutcome;
    type Context = PoolRegistry;

    const NAME: &'static str = "RadialSweep";
    const EXPOSED: &'static [&'static str] = &["timer", "cooldown", "curr_angle"];

    fn start(&mut self, _pools: &mut PoolRegistry, source: TimeSource) {
        self.timer = Some(Timer::new(self.settings.sweep_duration, source.clone()));
        self.cooldown = Some(Timer::new(self.settings.fire_interval, source.clone()));
        self.curr_angle = 0.0;
        self.volleys = 0;
        self.time_source = Some(source);
        self.phase = SweepPhase::Sweeping;
    }

    fn resume(&mut self, pools: &mut PoolRegistry, _input: ()) -> Resume<PatternOutcome> {
        if self.phase == SweepPhase::Sweeping {
            let Some(timer) = self.timer.as_ref() else {
                return Resume::Complete(PatternOutcome::Done { volleys: 0 });
            };
            if !timer.is_over() {
                let progress = (timer.get_time() / timer.duration) as f32;
                let due = self.cooldown.as_mut().map(|cooldown| {
                    let over = cooldown.is_over();
                    if over {
                        cooldown.restart();
                    }
                    over
                });
                if due == Some(true) {
                    self.curr_angle = lerp(0.0, 360.0, progress);
                    self.fire(pools);
                }
                return Resume::Yield;
            }
            let settle = self.settings.settle_duration;
            if let Some(timer) = self.timer.as_mut() {
                timer.set_duration(settle, true);
            }
            self.phase = SweepPhase::Settling;
        }

        if self.phase == SweepPhase::Settling {
            if self.timer.as_ref().is_some_and(|t| !t.is_over()) {
                return Resume::Yield;
            }
            self.phase = SweepPhase::Finished;
        }

        Resume::Complete(PatternOutcome::Done {
            volleys: self.volleys,
        })
    }

    fn expose(&self, name: &str) -> Option<ExposedValue> {
        match name {
            "timer" => self.timer.clone().map(ExposedValue::Timer),
            "cooldown" => self.cooldown.clone().map(ExposedValue::Timer),
            "curr_angle" => Some(ExposedValue::Float(self.curr_angle as f64)),
            _ => None,
        }
    }
}
