//! Simulation configuration
//!
//! Loaded from TOML, then environment overrides are applied:
//! - `CINDER_SEED` replaces the RNG seed

use cinder_core::{CinderError, Rect, Result};
use cinder_particles::EffectLibrary;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Instances preallocated per pooled type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PoolConfig {
    #[serde(default = "default_capacity")]
    pub particles: usize,
    #[serde(default = "default_capacity")]
    pub projectiles: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            particles: default_capacity(),
            projectiles: default_capacity(),
        }
    }
}

fn default_capacity() -> usize {
    100
}

fn default_bounds() -> Rect {
    Rect::new(0.0, 0.0, 960.0, 540.0)
}

fn default_seed() -> u64 {
    0xDEAD_BEEF
}

/// Top-level simulation config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Visible screen area
    #[serde(default = "default_bounds")]
    pub bounds: Rect,
    #[serde(default)]
    pub pools: PoolConfig,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Longest host frame the world accepts, in seconds. Unset takes every
    /// delta whole; a cap drops the excess of a slower frame.
    #[serde(default)]
    pub max_frame_time: Option<f64>,
    /// Extra template file, relative to the config file
    #[serde(default)]
    pub effects_file: Option<PathBuf>,
    /// Inline templates, one table per effect name
    #[serde(default)]
    pub effects: toml::value::Table,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            bounds: default_bounds(),
            pools: PoolConfig::default(),
            seed: default_seed(),
            max_frame_time: None,
            effects_file: None,
            effects: toml::value::Table::new(),
        }
    }
}

impl SimConfig {
    pub fn from_toml_str(src: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(src)
            .map_err(|e| CinderError::ConfigError(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file and apply environment overrides.
    /// A relative `effects_file` is resolved against the file's directory.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: SimConfig = toml::from_str(&content).map_err(|e| {
            CinderError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })?;
        if let (Some(file), Some(dir)) = (config.effects_file.as_mut(), path.parent()) {
            if file.is_relative() {
                *file = dir.join(&*file);
            }
        }
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let b = &self.bounds;
        if !(b.w > 0.0 && b.h > 0.0) {
            return Err(CinderError::ConfigError(format!(
                "bounds must have a positive size, got {}x{}",
                b.w, b.h
            )));
        }
        if let Some(max) = self.max_frame_time {
            if !(max.is_finite() && max > 0.0) {
                return Err(CinderError::ConfigError(format!(
                    "max_frame_time must be positive, got {max}"
                )));
            }
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(seed) = std::env::var("CINDER_SEED") {
            match parse_seed(&seed) {
                Some(seed) => self.seed = seed,
                None => log::warn!("[config] ignoring CINDER_SEED={seed:?}: not an integer"),
            }
        }
    }

    /// Build the template library from the external file (if any) and the
    /// inline table. Inline templates win on name clashes.
    pub fn effect_library(&self) -> Result<EffectLibrary> {
        let mut library = match &self.effects_file {
            Some(path) => EffectLibrary::from_file(path)?,
            None => EffectLibrary::new(),
        };
        library.load_table(&self.effects)?;
        Ok(library)
    }
}

/// Decimal or `0x`-prefixed hexadecimal
fn parse_seed(s: &str) -> Option<u64> {
    let s = s.trim();
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cinder_config_{}_{}", tag, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn defaults_preallocate_one_hundred() {
        let config = SimConfig::from_toml_str("").unwrap();
        assert_eq!(config.pools.particles, 100);
        assert_eq!(config.pools.projectiles, 100);
        assert_eq!(config.bounds, Rect::new(0.0, 0.0, 960.0, 540.0));
        assert!(config.effects.is_empty());
        assert_eq!(config.max_frame_time, None);
    }

    #[test]
    fn frame_cap_must_be_positive() {
        let config = SimConfig::from_toml_str("max_frame_time = 0.25").unwrap();
        assert_eq!(config.max_frame_time, Some(0.25));
        let err = SimConfig::from_toml_str("max_frame_time = 0").unwrap_err();
        assert!(matches!(err, CinderError::ConfigError(_)));
    }

    #[test]
    fn parse_inline_effects() {
        let config = SimConfig::from_toml_str(
            r#"
seed = 7

[bounds]
x = 0
y = 0
w = 640
h = 480

[pools]
particles = 500

[effects.puff]
init_spawn_count = 4
lifetime = 1.5
"#,
        )
        .unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.bounds.w, 640.0);
        assert_eq!(config.pools.particles, 500);
        assert_eq!(config.pools.projectiles, 100);

        let library = config.effect_library().unwrap();
        assert_eq!(library.get("puff").unwrap().init_spawn_count, 4);
    }

    #[test]
    fn zero_bounds_rejected() {
        let err = SimConfig::from_toml_str("[bounds]\nx = 0\ny = 0\nw = 0\nh = 10\n").unwrap_err();
        assert!(matches!(err, CinderError::ConfigError(_)));
    }

    #[test]
    fn malformed_config_is_a_config_error() {
        let err = SimConfig::from_toml_str("seed = \"many\"").unwrap_err();
        assert!(matches!(err, CinderError::ConfigError(_)));
    }

    #[test]
    fn effects_file_resolves_relative_to_config() {
        let dir = temp_dir("effects_file");
        let mut effects = std::fs::File::create(dir.join("effects.toml")).unwrap();
        effects
            .write_all(b"[effects.sparks]\ncooldown = 0.2\npart_per_wave = 3\n")
            .unwrap();
        let config_path = dir.join("sim.toml");
        std::fs::write(
            &config_path,
            "effects_file = \"effects.toml\"\n[effects.local]\nlifetime = 2\n",
        )
        .unwrap();

        let config = SimConfig::load_from_file(&config_path).unwrap();
        let library = config.effect_library().unwrap();
        assert_eq!(library.names(), vec!["local", "sparks"]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SimConfig::load_from_file(Path::new("/nonexistent/cinder/sim.toml")).unwrap_err();
        assert!(matches!(err, CinderError::IoError(_)));
    }

    #[test]
    fn seed_parsing() {
        assert_eq!(parse_seed("42"), Some(42));
        assert_eq!(parse_seed(" 0xff "), Some(255));
        assert_eq!(parse_seed("nope"), None);
    }
}
