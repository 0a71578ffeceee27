//! Named effect templates

use crate::template::EffectTemplate;
use cinder_core::{CinderError, Result};
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

/// Registry of validated templates, keyed by effect name
#[derive(Debug, Default, Clone)]
pub struct EffectLibrary {
    templates: HashMap<String, Rc<EffectTemplate>>,
}

impl EffectLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a template, replacing any previous one of that name
    pub fn register(&mut self, name: impl Into<String>, template: EffectTemplate) -> Result<()> {
        let name = name.into();
        template.validate().map_err(|e| scoped(&name, e))?;
        log::info!("[particles] registered effect '{name}'");
        self.templates.insert(name, Rc::new(template));
        Ok(())
    }

    /// Register every entry of an `effects` table. Stops at the first invalid template.
    pub fn load_table(&mut self, effects: &toml::value::Table) -> Result<usize> {
        for (name, value) in effects {
            let table = value.as_table().ok_or_else(|| {
                CinderError::InvalidTemplate(format!("{name}: expected a table"))
            })?;
            let template = EffectTemplate::from_toml(table).map_err(|e| scoped(name, e))?;
            self.register(name.clone(), template)?;
        }
        Ok(effects.len())
    }

    /// Parse a TOML document with an `[effects.<name>]` table per template
    pub fn from_toml_str(src: &str) -> Result<Self> {
        let doc: toml::value::Table = toml::from_str(src)?;
        let effects = doc
            .get("effects")
            .and_then(|v| v.as_table())
            .ok_or_else(|| CinderError::ConfigError("missing [effects] table".into()))?;
        let mut library = Self::new();
        library.load_table(effects)?;
        Ok(library)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let src = std::fs::read_to_string(path)?;
        Self::from_toml_str(&src)
    }

    pub fn get(&self, name: &str) -> Option<Rc<EffectTemplate>> {
        self.templates.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Template names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Prefix template errors with the effect name
fn scoped(name: &str, err: CinderError) -> CinderError {
    match err {
        CinderError::InvalidRange { field, min, max } if !field.contains('.') => {
            CinderError::InvalidRange {
                field: format!("{name}.{field}"),
                min,
                max,
            }
        }
        CinderError::InvalidTemplate(msg) if !msg.starts_with(name) => {
            CinderError::InvalidTemplate(format!("{name}: {msg}"))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EFFECTS: &str = r#"
[effects.sparks]
angle = [80, 100]
speed = [5, 9]
accel_y = [0.12, 0.15]
lifetime = 5
init_spawn_count = 3
cooldown = 0.2
target_spawn_count = 35
part_per_wave = 3
destroy_offscreen = false

[effects.swirl]
velocity_x = [1.5, 1.6]
velocity_y = [0.8, 0.82]
angle = [0, 20]
speed = [20, 22]
lifetime = 5
init_spawn_count = 1
cooldown = 0.05
target_spawn_count = 35
update_method = "spiral"
"#;

    #[test]
    fn load_named_templates() {
        let library = EffectLibrary::from_toml_str(EFFECTS).unwrap();
        assert_eq!(library.names(), vec!["sparks", "swirl"]);
        assert_eq!(library.get("sparks").unwrap().part_per_wave, 3);
        assert!(library.get("missing").is_none());
    }

    #[test]
    fn invalid_template_names_the_effect() {
        let src = "[effects.broken]\naccel_y = [0.15, 0.12]\n";
        match EffectLibrary::from_toml_str(src).unwrap_err() {
            CinderError::InvalidRange { field, .. } => assert_eq!(field, "broken.accel_y"),
            other => panic!("expected InvalidRange, got {other:?}"),
        }

        let src = "[effects.slow]\ncooldown = 0\n";
        let msg = EffectLibrary::from_toml_str(src).unwrap_err().to_string();
        assert!(msg.contains("slow"));
    }

    #[test]
    fn missing_effects_table_is_a_config_error() {
        let err = EffectLibrary::from_toml_str("title = 'nothing'").unwrap_err();
        assert!(matches!(err, CinderError::ConfigError(_)));
    }

    #[test]
    fn register_validates() {
        let mut library = EffectLibrary::new();
        let bad = EffectTemplate {
            cooldown: -1.0,
            ..Default::default()
        };
        assert!(library.register("bad", bad).is_err());
        assert!(library.is_empty());
        library.register("ok", EffectTemplate::default()).unwrap();
        assert_eq!(library.len(), 1);
    }
}
