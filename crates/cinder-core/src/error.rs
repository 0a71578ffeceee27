//! Error types for Cinder

use thiserror::Error;

/// The main error type for Cinder operations
#[derive(Debug, Error)]
pub enum CinderError {
    #[error("Pool exhausted: no inactive {kind} instance available")]
    PoolExhausted { kind: &'static str },

    #[error("Pool not registered: {0}")]
    UnregisteredPool(&'static str),

    #[error("Unknown effect template: {0}")]
    UnknownEffectTemplate(String),

    #[error("Invalid range for {field}: min {min} is greater than max {max}")]
    InvalidRange { field: String, min: f64, max: f64 },

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Timer misuse: {0}")]
    TimerMisuse(String),

    #[error("Script protocol violation: {0}")]
    ScriptProtocolViolation(String),

    #[error("Variable '{name}' is not exposed by script {script}")]
    UnexposedVariable { script: &'static str, name: String },

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),
}

/// Result type alias for Cinder operations
pub type Result<T> = std::result::Result<T, CinderError>;

impl From<toml::de::Error> for CinderError {
    fn from(err: toml::de::Error) -> Self {
        CinderError::TomlParseError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = CinderError::PoolExhausted { kind: "particle" };
        assert!(err.to_string().contains("particle"));

        let err = CinderError::InvalidRange {
            field: "accel_y".into(),
            min: 0.15,
            max: 0.12,
        };
        let msg = err.to_string();
        assert!(msg.contains("accel_y"));
        assert!(msg.contains("0.15"));
    }

    #[test]
    fn toml_errors_convert() {
        let bad: std::result::Result<toml::Value, _> = toml::from_str("a = [");
        let err: CinderError = bad.unwrap_err().into();
        assert!(matches!(err, CinderError::TomlParseError(_)));
    }
}
