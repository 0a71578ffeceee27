//! Effect template listing and validation

use anyhow::{bail, Context, Result};
use cinder_particles::{EffectTemplate, NumberRange, UpdateMethod};

pub fn run(file: &str) -> Result<()> {
    let src = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file))?;
    let doc: toml::value::Table =
        toml::from_str(&src).with_context(|| format!("Failed to parse {}", file))?;
    let Some(effects) = doc.get("effects").and_then(|v| v.as_table()) else {
        bail!("{} has no [effects] table", file);
    };

    if effects.is_empty() {
        println!("No effect templates in {}", file);
        return Ok(());
    }

    println!("{} effect template(s) in {}:", effects.len(), file);
    for (name, value) in effects {
        let Some(table) = value.as_table() else {
            bail!("effects.{} must be a table", name);
        };
        let template = EffectTemplate::from_toml(table)
            .with_context(|| format!("Invalid effect template '{}'", name))?;
        println!("  {}", describe(name, &template));
    }
    println!("All templates valid.");
    Ok(())
}

fn describe(name: &str, t: &EffectTemplate) -> String {
    let method = match t.update_method {
        UpdateMethod::Simulated => "simulated",
        UpdateMethod::Spiral => "spiral",
        UpdateMethod::Animated => "animated",
    };
    let mut line = format!(
        "{:<16} {:<9} initial {} then {} per {}s up to {}, lifetime {}",
        name,
        method,
        t.init_spawn_count,
        t.part_per_wave,
        t.cooldown,
        t.target_spawn_count,
        range(&t.lifetime)
    );
    if let Some(tag) = &t.tag {
        line.push_str(&format!(" [{}]", tag));
    }
    line
}

fn range(r: &NumberRange) -> String {
    match r {
        NumberRange::Fixed(v) => format!("{}", v),
        NumberRange::Uniform { min, max } => format!("{}..{}", min, max),
    }
}
