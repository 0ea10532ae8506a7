use crate::record::sample::{DEFAULT_SAMPLE_DAYS, MAX_SAMPLE_DAYS};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::Level;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const DEFAULT_SERVER_PORT: u16 = 8080;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: AppSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub server: Option<ServerSection>,
    #[serde(default)]
    pub engine: Option<EngineSection>,
    #[serde(default)]
    pub sample: Option<SampleSection>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSection {
    /// Port to listen on (default: 8080)
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineSection {
    /// Fixed seed for forecast perturbation and offer selection. Unset means
    /// a fresh entropy seed per request.
    pub seed: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SampleSection {
    /// Days of demo data served by /api/sample (default: 30)
    pub days: Option<u32>,
    pub seed: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

pub fn load_default() -> Result<Config, ConfigError> {
    load_from_path(DEFAULT_CONFIG_PATH)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    Ok(config)
}

impl Config {
    /// Returns the tracing level, falling back to INFO on unknown names.
    pub fn log_level(&self) -> Level {
        self.logging.level.trim().parse().unwrap_or(Level::INFO)
    }

    /// Returns the server port (default: 8080)
    pub fn server_port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_SERVER_PORT)
    }

    pub fn engine_seed(&self) -> Option<u64> {
        self.engine.as_ref().and_then(|e| e.seed)
    }

    /// Returns the number of demo days (default: 30, at most ten years)
    pub fn sample_days(&self) -> u32 {
        self.sample
            .as_ref()
            .and_then(|s| s.days)
            .unwrap_or(DEFAULT_SAMPLE_DAYS)
            .min(MAX_SAMPLE_DAYS)
    }

    pub fn sample_seed(&self) -> Option<u64> {
        self.sample.as_ref().and_then(|s| s.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn write_temp(
        name: &str,
        contents: &str,
    ) -> Result<std::path::PathBuf, Box<dyn std::error::Error>> {
        let unique = SystemTime::now().duration_since(UNIX_EPOCH)?.as_nanos();
        let path = std::env::temp_dir().join(format!("retailpulse-{name}-{unique}.toml"));
        fs::write(&path, contents)?;
        Ok(path)
    }

    #[test]
    fn default_config_pins_sample_seed() -> Result<(), Box<dyn std::error::Error>> {
        let config = load_default()?;
        assert_eq!(config.app.name, "retailpulse");
        assert!(config.sample_seed().is_some());
        Ok(())
    }

    #[test]
    fn optional_sections_fall_back_to_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let path = write_temp(
            "minimal",
            r#"
[app]
name = "retailpulse"

[logging]
level = "debug"
"#,
        )?;

        let result = load_from_path(&path)?;
        let _ = fs::remove_file(&path);

        assert_eq!(result.server_port(), DEFAULT_SERVER_PORT);
        assert_eq!(result.engine_seed(), None);
        assert_eq!(result.sample_days(), DEFAULT_SAMPLE_DAYS);
        assert_eq!(result.log_level(), Level::DEBUG);
        Ok(())
    }

    #[test]
    fn engine_and_sample_sections_are_read() -> Result<(), Box<dyn std::error::Error>> {
        let path = write_temp(
            "engine",
            r#"
[app]
name = "retailpulse"

[logging]
level = "warn"

[server]
port = 9090

[engine]
seed = 42

[sample]
days = 7
seed = 3
"#,
        )?;

        let result = load_from_path(&path)?;
        let _ = fs::remove_file(&path);

        assert_eq!(result.server_port(), 9090);
        assert_eq!(result.engine_seed(), Some(42));
        assert_eq!(result.sample_days(), 7);
        assert_eq!(result.sample_seed(), Some(3));
        Ok(())
    }

    #[test]
    fn unknown_log_level_defaults_to_info() -> Result<(), Box<dyn std::error::Error>> {
        let path = write_temp(
            "level",
            r#"
[app]
name = "retailpulse"

[logging]
level = "chatty"
"#,
        )?;

        let result = load_from_path(&path)?;
        let _ = fs::remove_file(&path);

        assert_eq!(result.log_level(), Level::INFO);
        Ok(())
    }

    #[test]
    fn missing_config_file_returns_read_error() {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("retailpulse-missing-{unique}.toml"));

        let result = load_from_path(&path);

        assert!(matches!(result, Err(ConfigError::Read(_))));
    }

    #[test]
    fn invalid_toml_returns_parse_error() -> Result<(), Box<dyn std::error::Error>> {
        let path = write_temp("invalid", "not = [valid")?;

        let result = load_from_path(&path);
        let _ = fs::remove_file(&path);

        assert!(matches!(result, Err(ConfigError::Parse(_))));
        Ok(())
    }

    #[test]
    fn oversized_sample_days_are_capped() -> Result<(), Box<dyn std::error::Error>> {
        let path = write_temp(
            "sample-days",
            r#"
[app]
name = "retailpulse"

[logging]
level = "info"

[sample]
days = 4000000000
"#,
        )?;

        let result = load_from_path(&path)?;
        let _ = fs::remove_file(&path);

        assert_eq!(result.sample_days(), MAX_SAMPLE_DAYS);
        Ok(())
    }
}
