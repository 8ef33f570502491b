use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::keymap::KeyMap;

/// Prefix for environment overrides, e.g. `MIDI2QWERTY_STARTUP_DELAY_SECS=0`
pub const ENV_PREFIX: &str = "MIDI2QWERTY";

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub client_name: String,
    pub startup_delay_secs: u64,
    pub queue_capacity: usize,
    pub injector: InjectorConfig,
    /// Note number -> key name, applied on top of the built-in table
    #[serde(default)]
    pub mappings: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InjectorConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl AppConfig {
    /// Layer the embedded defaults, an optional user file and the environment.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "queue_capacity must be at least 1".to_string(),
            )));
        }
        if self.injector.program.trim().is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "injector.program must not be empty".to_string(),
            )));
        }
        Ok(())
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_secs(self.startup_delay_secs)
    }

    pub fn keymap(&self) -> Result<KeyMap> {
        KeyMap::with_overrides(&self.mappings)
    }
}
