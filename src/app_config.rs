use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use url::Url;

use crate::translation::batch::DEFAULT_PROMPT_BUDGET;

/// Application configuration module
/// This module handles loading, validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Maximum prompt size in bytes
    #[serde(default = "default_prompt_budget")]
    pub prompt_budget: usize,

    /// OpenAI settings
    #[serde(default)]
    pub openai: OpenAIConfig,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            prompt_budget: default_prompt_budget(),
            openai: OpenAIConfig::default(),
        }
    }
}

/// OpenAI service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenAIConfig {
    /// Model name; must support structured outputs
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// API key for the service; falls back to `OPENAI_API_KEY`
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Service endpoint URL (optional, for Azure OpenAI or compatible servers)
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sampling temperature, provider default when unset
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            model: default_openai_model(),
            api_key: String::new(),
            endpoint: default_openai_endpoint(),
            timeout_secs: default_timeout_secs(),
            temperature: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Environment variable holding the OpenAI API key
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

fn default_prompt_budget() -> usize {
    DEFAULT_PROMPT_BUDGET
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-2024-08-06".to_string()
}

impl Config {
    /// Load the configuration from `path`, writing a default one if the file is missing
    pub fn load_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }

    /// Fill an empty API key from the given lookup, normally the process environment
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.translation.openai.api_key.is_empty() {
            if let Some(key) = lookup(OPENAI_API_KEY_VAR).filter(|k| !k.is_empty()) {
                self.translation.openai.api_key = key;
            }
        }
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.translation.prompt_budget == 0 {
            return Err(anyhow!("prompt_budget must be greater than zero"));
        }

        let openai = &self.translation.openai;
        if openai.model.trim().is_empty() {
            return Err(anyhow!("OpenAI model name must not be empty"));
        }
        Url::parse(&openai.endpoint)
            .with_context(|| format!("Invalid OpenAI endpoint: {}", openai.endpoint))?;

        if let Some(temperature) = openai.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(anyhow!("temperature must be between 0.0 and 2.0, got {}", temperature));
            }
        }

        Ok(())
    }
}
