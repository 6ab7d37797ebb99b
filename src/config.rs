use crate::model::RenderMode;
use crate::services::{ExampleSource, ResolutionPolicy};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the compile service, e.g. `http://localhost:5000`
    pub endpoint_base: String,
    /// Example dataset location: URL, `examples.json` path or a directory of
    /// samples. Defaults to `examples.json` in the config directory; the
    /// compile service itself only serves `/compile`.
    pub examples: Option<String>,
    pub policy: ResolutionPolicy,
    pub render_mode: RenderMode,
    /// Compile request timeout. No timeout when unset.
    pub timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_base: "http://localhost:5000".to_string(),
            examples: None,
            policy: ResolutionPolicy::default(),
            render_mode: RenderMode::default(),
            timeout_secs: None,
        }
    }
}

impl Config {
    pub fn config_dir() -> Option<PathBuf> {
        let home = env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".smickel-playground"))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    pub fn load() -> Option<Config> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            return None;
        }

        let contents = fs::read_to_string(&config_path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %config_path.display(), error = %e, "ignoring invalid config");
                None
            }
        }
    }

    /// Load the saved config, or the defaults if there is none
    pub fn load_or_default() -> Config {
        Self::load().unwrap_or_default()
    }

    /// Save the config to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let config_dir = Self::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    /// `examples.json` next to the config file, or in the working directory
    /// when there is no home directory
    pub fn default_examples_path() -> PathBuf {
        Self::config_dir()
            .map(|dir| dir.join("examples.json"))
            .unwrap_or_else(|| PathBuf::from("examples.json"))
    }

    pub fn examples_source(&self) -> ExampleSource {
        match &self.examples {
            Some(location) => ExampleSource::parse(location),
            None => ExampleSource::File(Self::default_examples_path()),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
