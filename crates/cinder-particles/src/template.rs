//! Effect templates (parsed from TOML) and their validation

use crate::rand::ParticleRng;
use cinder_core::{CinderError, Result, Vec2};
use cinder_pool::VisualHandle;

/// A scalar or a `[min, max]` interval sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberRange {
    Fixed(f32),
    Uniform { min: f32, max: f32 },
}

impl NumberRange {
    /// Build an interval, rejecting `min > max` and non-finite bounds
    pub fn uniform(field: &str, min: f32, max: f32) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(CinderError::InvalidTemplate(format!(
                "{field}: range bounds must be finite"
            )));
        }
        if min > max {
            return Err(CinderError::InvalidRange {
                field: field.to_string(),
                min: min as f64,
                max: max as f64,
            });
        }
        Ok(NumberRange::Uniform { min, max })
    }

    pub fn sample(&self, rng: &mut ParticleRng) -> f32 {
        match *self {
            NumberRange::Fixed(v) => v,
            NumberRange::Uniform { min, max } => rng.range(min, max),
        }
    }

    pub fn min(&self) -> f32 {
        match *self {
            NumberRange::Fixed(v) => v,
            NumberRange::Uniform { min, .. } => min,
        }
    }

    pub fn max(&self) -> f32 {
        match *self {
            NumberRange::Fixed(v) => v,
            NumberRange::Uniform { max, .. } => max,
        }
    }
}

impl From<f32> for NumberRange {
    fn from(v: f32) -> Self {
        NumberRange::Fixed(v)
    }
}

/// How a particle moves each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpdateMethod {
    #[default]
    Simulated,
    Spiral,
    /// Position is fixed; only the animation advances
    Animated,
}

impl UpdateMethod {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "simulated" => Ok(UpdateMethod::Simulated),
            "spiral" => Ok(UpdateMethod::Spiral),
            "animated" => Ok(UpdateMethod::Animated),
            other => Err(CinderError::InvalidTemplate(format!(
                "unknown update_method '{other}' (expected simulated, spiral or animated)"
            ))),
        }
    }
}

/// Frame list played against the particle's time source
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationSpec {
    pub frames: Vec<VisualHandle>,
    /// Seconds per frame
    pub frame_time: f32,
    pub looping: bool,
}

impl AnimationSpec {
    /// Frame shown `elapsed` seconds after the animation started
    pub fn frame_at(&self, elapsed: f64) -> Option<VisualHandle> {
        let len = self.frames.len();
        if len == 0 {
            return None;
        }
        let step = (elapsed.max(0.0) / self.frame_time as f64).floor() as usize;
        let index = if self.looping { step % len } else { step.min(len - 1) };
        self.frames.get(index).copied()
    }
}

/// Immutable description of a particle effect
#[derive(Debug, Clone, PartialEq)]
pub struct EffectTemplate {
    pub offset_x: NumberRange,
    pub offset_y: NumberRange,
    /// Cartesian start velocity; present only when both axes are given
    pub velocity_x: Option<NumberRange>,
    pub velocity_y: Option<NumberRange>,
    /// Polar start direction in degrees
    pub angle: Option<NumberRange>,
    /// Polar speed (radius for spiral particles)
    pub speed: Option<NumberRange>,
    pub accel_x: NumberRange,
    pub accel_y: NumberRange,
    pub drag: NumberRange,
    pub lifetime: NumberRange,
    pub init_spawn_count: u32,
    /// Seconds between waves
    pub cooldown: f64,
    pub target_spawn_count: u32,
    pub part_per_wave: u32,
    pub main_visual: VisualHandle,
    pub alt_visuals: Vec<VisualHandle>,
    pub animation: Option<AnimationSpec>,
    pub update_method: UpdateMethod,
    pub destroy_offscreen: bool,
    /// Give each particle its own mutable copy of the visuals
    pub copy_surface: bool,
    /// Bounding box size used for the offscreen test
    pub size: Vec2,
    /// Host-side specialization key
    pub tag: Option<String>,
}

impl Default for EffectTemplate {
    fn default() -> Self {
        Self {
            offset_x: NumberRange::Fixed(0.0),
            offset_y: NumberRange::Fixed(0.0),
            velocity_x: None,
            velocity_y: None,
            angle: None,
            speed: None,
            accel_x: NumberRange::Fixed(0.0),
            accel_y: NumberRange::Fixed(0.0),
            drag: NumberRange::Fixed(0.0),
            lifetime: NumberRange::Fixed(0.0),
            init_spawn_count: 0,
            cooldown: 0.25,
            target_spawn_count: 0,
            part_per_wave: 1,
            main_visual: VisualHandle(0),
            alt_visuals: Vec::new(),
            animation: None,
            update_method: UpdateMethod::Simulated,
            destroy_offscreen: true,
            copy_surface: false,
            size: Vec2::splat(4.0),
            tag: None,
        }
    }
}

impl EffectTemplate {
    /// Parse a template from one `[effects.<name>]` TOML table and validate it
    pub fn from_toml(table: &toml::value::Table) -> Result<Self> {
        let mut template = Self::default();

        if let Some(r) = toml_range(table, "offset_x")? {
            template.offset_x = r;
        }
        if let Some(r) = toml_range(table, "offset_y")? {
            template.offset_y = r;
        }
        template.velocity_x = toml_range(table, "velocity_x")?;
        template.velocity_y = toml_range(table, "velocity_y")?;
        template.angle = toml_range(table, "angle")?;
        template.speed = toml_range(table, "speed")?;
        if let Some(r) = toml_range(table, "accel_x")? {
            template.accel_x = r;
        }
        if let Some(r) = toml_range(table, "accel_y")? {
            template.accel_y = r;
        }
        if let Some(r) = toml_range(table, "drag")? {
            template.drag = r;
        }
        if let Some(r) = toml_range(table, "lifetime")? {
            template.lifetime = r;
        }

        if let Some(v) = table.get("init_spawn_count") {
            template.init_spawn_count = toml_count(v, "init_spawn_count")?;
        }
        if let Some(v) = table.get("cooldown") {
            template.cooldown = toml_f64(v).ok_or_else(|| expected("cooldown", "a number"))?;
        }
        if let Some(v) = table.get("target_spawn_count") {
            template.target_spawn_count = toml_count(v, "target_spawn_count")?;
        }
        if let Some(v) = table.get("part_per_wave") {
            template.part_per_wave = toml_count(v, "part_per_wave")?;
        }

        if let Some(v) = table.get("main_visual") {
            template.main_visual = toml_visual(v, "main_visual")?;
        }
        if let Some(v) = table.get("alt_visuals") {
            template.alt_visuals = toml_visual_list(v, "alt_visuals")?;
        }
        if let Some(v) = table.get("animation") {
            let anim = v
                .as_table()
                .ok_or_else(|| expected("animation", "a table"))?;
            template.animation = Some(AnimationSpec {
                frames: match anim.get("frames") {
                    Some(f) => toml_visual_list(f, "animation.frames")?,
                    None => Vec::new(),
                },
                frame_time: anim
                    .get("frame_time")
                    .and_then(toml_f32)
                    .unwrap_or(0.1),
                looping: anim.get("looping").and_then(|l| l.as_bool()).unwrap_or(true),
            });
        }

        if let Some(v) = table.get("update_method") {
            let s = v
                .as_str()
                .ok_or_else(|| expected("update_method", "a string"))?;
            template.update_method = UpdateMethod::parse(s)?;
        }
        if let Some(v) = table.get("destroy_offscreen") {
            template.destroy_offscreen = v
                .as_bool()
                .ok_or_else(|| expected("destroy_offscreen", "a boolean"))?;
        }
        if let Some(v) = table.get("copy_surface") {
            template.copy_surface = v
                .as_bool()
                .ok_or_else(|| expected("copy_surface", "a boolean"))?;
        }
        if let Some(v) = table.get("size") {
            template.size = toml_vec2(v).ok_or_else(|| expected("size", "[w, h]"))?;
        }
        if let Some(v) = table.get("tag") {
            template.tag = Some(
                v.as_str()
                    .ok_or_else(|| expected("tag", "a string"))?
                    .to_string(),
            );
        }

        template.validate()?;
        Ok(template)
    }

    /// Check the invariants the emitter relies on.
    ///
    /// Range bounds are already ordered when built through [`NumberRange::uniform`];
    /// this also catches hand-built templates.
    pub fn validate(&self) -> Result<()> {
        for (field, range) in self.ranges() {
            let (min, max) = (range.min(), range.max());
            if !min.is_finite() || !max.is_finite() {
                return Err(CinderError::InvalidTemplate(format!(
                    "{field}: range bounds must be finite"
                )));
            }
            if min > max {
                return Err(CinderError::InvalidRange {
                    field: field.to_string(),
                    min: min as f64,
                    max: max as f64,
                });
            }
        }

        if !(self.cooldown.is_finite() && self.cooldown > 0.0) {
            return Err(CinderError::InvalidTemplate(format!(
                "cooldown must be positive and finite, got {}",
                self.cooldown
            )));
        }
        if self.part_per_wave == 0 {
            return Err(CinderError::InvalidTemplate(
                "part_per_wave must be at least 1".into(),
            ));
        }
        if self.drag.min() < 0.0 || self.drag.max() >= 1.0 {
            return Err(CinderError::InvalidTemplate(format!(
                "drag must lie in [0, 1), got [{}, {}]",
                self.drag.min(),
                self.drag.max()
            )));
        }
        if self.velocity_x.is_some() != self.velocity_y.is_some() {
            return Err(CinderError::InvalidTemplate(
                "velocity_x and velocity_y must be given together".into(),
            ));
        }
        if let Some(anim) = &self.animation {
            if anim.frames.is_empty() {
                return Err(CinderError::InvalidTemplate(
                    "animation needs at least one frame".into(),
                ));
            }
            if !(anim.frame_time.is_finite() && anim.frame_time > 0.0) {
                return Err(CinderError::InvalidTemplate(format!(
                    "animation frame_time must be positive, got {}",
                    anim.frame_time
                )));
            }
        }
        if self.update_method == UpdateMethod::Animated && self.animation.is_none() {
            return Err(CinderError::InvalidTemplate(
                "update_method 'animated' requires an animation".into(),
            ));
        }
        Ok(())
    }

    fn ranges(&self) -> Vec<(&'static str, NumberRange)> {
        let mut out = vec![
            ("offset_x", self.offset_x),
            ("offset_y", self.offset_y),
            ("accel_x", self.accel_x),
            ("accel_y", self.accel_y),
            ("drag", self.drag),
            ("lifetime", self.lifetime),
        ];
        let optional = [
            ("velocity_x", self.velocity_x),
            ("velocity_y", self.velocity_y),
            ("angle", self.angle),
            ("speed", self.speed),
        ];
        out.extend(optional.into_iter().filter_map(|(f, r)| r.map(|r| (f, r))));
        out
    }
}

// ── TOML helpers (handle integer/float coercion) ──

fn expected(field: &str, what: &str) -> CinderError {
    CinderError::InvalidTemplate(format!("{field} must be {what}"))
}

fn toml_f32(v: &toml::Value) -> Option<f32> {
    toml_f64(v).map(|f| f as f32)
}

fn toml_f64(v: &toml::Value) -> Option<f64> {
    v.as_float().or_else(|| v.as_integer().map(|i| i as f64))
}

fn toml_range(table: &toml::value::Table, field: &str) -> Result<Option<NumberRange>> {
    let Some(v) = table.get(field) else {
        return Ok(None);
    };
    if let Some(x) = toml_f32(v) {
        if !x.is_finite() {
            return Err(CinderError::InvalidTemplate(format!(
                "{field} must be finite"
            )));
        }
        return Ok(Some(NumberRange::Fixed(x)));
    }
    match v.as_array().map(|a| a.as_slice()) {
        Some([lo, hi]) => match (toml_f32(lo), toml_f32(hi)) {
            (Some(lo), Some(hi)) => NumberRange::uniform(field, lo, hi).map(Some),
            _ => Err(expected(field, "a number or [min, max]")),
        },
        _ => Err(expected(field, "a number or [min, max]")),
    }
}

fn toml_count(v: &toml::Value, field: &str) -> Result<u32> {
    v.as_integer()
        .and_then(|i| u32::try_from(i).ok())
        .ok_or_else(|| expected(field, "a non-negative integer"))
}

fn toml_visual(v: &toml::Value, field: &str) -> Result<VisualHandle> {
    toml_count(v, field).map(VisualHandle)
}

fn toml_visual_list(v: &toml::Value, field: &str) -> Result<Vec<VisualHandle>> {
    v.as_array()
        .ok_or_else(|| expected(field, "an array of visual ids"))?
        .iter()
        .map(|item| toml_visual(item, field))
        .collect()
}

fn toml_vec2(v: &toml::Value) -> Option<Vec2> {
    match v.as_array()?.as_slice() {
        [x, y] => Some(Vec2::new(toml_f32(x)?, toml_f32(y)?)),
        _ => None,
    }
}
