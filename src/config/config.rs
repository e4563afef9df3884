//! Main configuration structure and implementation

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use ugen_language::LanguageSettings;

use super::{CoverageConfig, GenerationConfig, HistoryConfig, LlmConfig};
use crate::utils::expand_path;
use crate::UgenError;

/// File names looked up in the working directory, in order
pub const CONFIG_FILE_NAMES: [&str; 4] = [".ugen.yaml", ".ugen.yml", "ugen.yaml", "ugen.yml"];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Model server settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Cover loop limits
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Coverage report location and format
    #[serde(default)]
    pub coverage: CoverageConfig,

    /// Per-language plugin settings keyed by language id
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub languages: BTreeMap<String, LanguageSettings>,

    /// Run history
    #[serde(default)]
    pub history: HistoryConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {path:?}"))?;
        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file {path:?}"))?;
        config.expand_paths()?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.version != "1.0" {
            return Err(UgenError::Config(format!(
                "Unsupported configuration version: {}",
                self.version
            ))
            .into());
        }

        self.llm.validate()?;
        self.generation.validate()?;

        if let Some(0) = self.history.max_entries {
            return Err(UgenError::Config("history.max_entries must be positive".to_string()).into());
        }

        Ok(())
    }

    /// Path of the global configuration file
    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ugen").join("config.yaml"))
    }

    /// Find the configuration file to use
    ///
    /// An explicit path must exist. Otherwise the working directory is searched
    /// first, then the global configuration directory.
    pub fn locate(explicit: Option<&Path>, working_dir: &Path) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(anyhow!("Configuration file not found: {:?}", path));
            }
            return Ok(Some(path.to_path_buf()));
        }

        for name in CONFIG_FILE_NAMES {
            let candidate = working_dir.join(name);
            if candidate.exists() {
                return Ok(Some(candidate));
            }
        }

        Ok(Self::global_path().filter(|path| path.exists()))
    }

    /// Load the configuration in effect, falling back to defaults
    ///
    /// Environment overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let working_dir = std::env::current_dir()?;
        let path = Self::locate(explicit, &working_dir)?;
        let mut config = match &path {
            Some(path) => {
                debug!("Loading configuration from {:?}", path);
                Self::from_file(path)?
            }
            None => {
                debug!("No configuration file found, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok((config, path))
    }

    /// Apply `UGEN_LLM_MODEL` and `UGEN_LLM_API_BASE`
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("UGEN_LLM_MODEL").filter(|v| !v.trim().is_empty()) {
            debug!("Model overridden from environment: {}", model);
            self.llm.model = model;
        }
        if let Some(api_base) = lookup("UGEN_LLM_API_BASE").filter(|v| !v.trim().is_empty()) {
            debug!("API base overridden from environment: {}", api_base);
            self.llm.api_base = api_base;
        }
    }

    /// Expand `~` and environment variables in configured paths
    pub fn expand_paths(&mut self) -> Result<()> {
        self.coverage.report_path = expand_path(&self.coverage.report_path)?;
        if let Some(diff) = &self.coverage.diff_report_path {
            self.coverage.diff_report_path = Some(expand_path(diff)?);
        }
        self.history.path = expand_path(&self.history.path)?;
        for settings in self.languages.values_mut() {
            if let Some(tests_dir) = &settings.tests_dir {
                settings.tests_dir = Some(expand_path(tests_dir)?);
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            llm: LlmConfig::default(),
            generation: GenerationConfig::default(),
            coverage: CoverageConfig::default(),
            languages: BTreeMap::new(),
            history: HistoryConfig::default(),
        }
    }
}
