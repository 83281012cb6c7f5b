//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Wikilens configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub wikidata: WikidataConfig,
    pub insight: InsightConfig,
    pub graph: GraphConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikidataConfig {
    pub base_url: String,
    pub commons_url: String,
    pub language: String,
    pub image_width: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightConfig {
    #[serde(skip)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub analysis_model: String,
    pub insight_model: String,
    pub comparison_model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    pub link_distance: f64,
    pub charge_strength: f64,
    pub collision_radius: f64,
    pub position_strength: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub theme: String,
    pub tick_rate_ms: u64,
}

impl Default for WikidataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.wikidata.org".to_string(),
            commons_url: "https://commons.wikimedia.org".to_string(),
            language: "en".to_string(),
            image_width: 400,
            timeout_secs: 20,
        }
    }
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            analysis_model: "gemini-3-flash-preview".to_string(),
            insight_model: "gemini-3-pro-preview".to_string(),
            comparison_model: "gemini-3-flash-preview".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            link_distance: 150.0,
            charge_strength: -400.0,
            collision_radius: 70.0,
            position_strength: 0.05,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            tick_rate_ms: 50,
        }
    }
}

impl InsightConfig {
    pub fn resolved_api_key(&self) -> anyhow::Result<Option<String>> {
        self.enforce_env_only()?;

        Ok(env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty()))
    }

    pub fn redacted_api_key(&self) -> anyhow::Result<Option<String>> {
        self.resolved_api_key()
            .map(|opt| opt.map(|key| redact_key(&key)))
    }

    pub fn enforce_env_only(&self) -> anyhow::Result<()> {
        if self.api_key.is_some() {
            return Err(anyhow!(
                "Generative AI API keys must be provided via environment variables, not stored in configuration"
            ));
        }
        Ok(())
    }
}

/// Mask a key down to its last four characters
pub(crate) fn redact_key(key: &str) -> String {
    match key.char_indices().rev().nth(3) {
        Some((start, _)) if start > 0 => format!("***{}", &key[start..]),
        _ => "***".to_string(),
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var("WIKILENS_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("wikilens")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or use defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to an explicit path, creating parent directories
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| {
                format!("Failed to create config directory: {}", dir.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        self.insight.enforce_env_only()?;

        if !matches!(self.ui.theme.as_str(), "dark" | "light") {
            return Err(anyhow!("ui.theme must be 'dark' or 'light'"));
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            // Wikidata settings
            "wikidata.base_url" => Ok(self.wikidata.base_url.clone()),
            "wikidata.commons_url" => Ok(self.wikidata.commons_url.clone()),
            "wikidata.language" => Ok(self.wikidata.language.clone()),
            "wikidata.image_width" => Ok(self.wikidata.image_width.to_string()),
            "wikidata.timeout_secs" => Ok(self.wikidata.timeout_secs.to_string()),

            // Insight settings
            "insight.base_url" => Ok(self.insight.base_url.clone()),
            "insight.analysis_model" => Ok(self.insight.analysis_model.clone()),
            "insight.insight_model" => Ok(self.insight.insight_model.clone()),
            "insight.comparison_model" => Ok(self.insight.comparison_model.clone()),
            "insight.timeout_secs" => Ok(self.insight.timeout_secs.to_string()),

            // Graph settings
            "graph.link_distance" => Ok(self.graph.link_distance.to_string()),
            "graph.charge_strength" => Ok(self.graph.charge_strength.to_string()),
            "graph.collision_radius" => Ok(self.graph.collision_radius.to_string()),
            "graph.position_strength" => Ok(self.graph.position_strength.to_string()),

            // UI settings
            "ui.theme" => Ok(self.ui.theme.clone()),
            "ui.tick_rate_ms" => Ok(self.ui.tick_rate_ms.to_string()),

            // API key (special handling - show redacted)
            "insight.api_key" | "api_key" => match self.insight.redacted_api_key()? {
                Some(redacted) => Ok(redacted),
                None => Ok("(not set - use GEMINI_API_KEY or API_KEY env var)".to_string()),
            },

            _ => Err(anyhow!("Unknown configuration key: {}", key)),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "wikidata.base_url" => self.wikidata.base_url = value.trim_end_matches('/').to_string(),
            "wikidata.commons_url" => {
                self.wikidata.commons_url = value.trim_end_matches('/').to_string()
            }
            "wikidata.language" => {
                if value.trim().is_empty() {
                    return Err(anyhow!("Language tag must not be empty"));
                }
                self.wikidata.language = value.trim().to_string();
            }
            "wikidata.image_width" => {
                self.wikidata.image_width = value
                    .parse()
                    .with_context(|| format!("Invalid image_width value: {}", value))?;
            }
            "wikidata.timeout_secs" => {
                self.wikidata.timeout_secs = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_secs value: {}", value))?;
            }

            "insight.base_url" => self.insight.base_url = value.trim_end_matches('/').to_string(),
            "insight.analysis_model" => self.insight.analysis_model = value.to_string(),
            "insight.insight_model" => self.insight.insight_model = value.to_string(),
            "insight.comparison_model" => self.insight.comparison_model = value.to_string(),
            "insight.timeout_secs" => {
                self.insight.timeout_secs = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_secs value: {}", value))?;
            }

            "graph.link_distance" => {
                let distance: f64 = value
                    .parse()
                    .with_context(|| format!("Invalid link_distance value: {}", value))?;
                if distance <= 0.0 {
                    return Err(anyhow!("Link distance must be positive"));
                }
                self.graph.link_distance = distance;
            }
            "graph.charge_strength" => {
                self.graph.charge_strength = value
                    .parse()
                    .with_context(|| format!("Invalid charge_strength value: {}", value))?;
            }
            "graph.collision_radius" => {
                let radius: f64 = value
                    .parse()
                    .with_context(|| format!("Invalid collision_radius value: {}", value))?;
                if radius < 0.0 {
                    return Err(anyhow!("Collision radius must be non-negative"));
                }
                self.graph.collision_radius = radius;
            }
            "graph.position_strength" => {
                let strength: f64 = value
                    .parse()
                    .with_context(|| format!("Invalid position_strength value: {}", value))?;
                if !(0.0..=1.0).contains(&strength) {
                    return Err(anyhow!("Position strength must be between 0.0 and 1.0"));
                }
                self.graph.position_strength = strength;
            }

            "ui.theme" => {
                let valid = ["dark", "light"];
                if !valid.contains(&value) {
                    return Err(anyhow!(
                        "Invalid theme: {}. Valid options: {}",
                        value,
                        valid.join(", ")
                    ));
                }
                self.ui.theme = value.to_string();
            }
            "ui.tick_rate_ms" => {
                let rate: u64 = value
                    .parse()
                    .with_context(|| format!("Invalid tick_rate_ms value: {}", value))?;
                if rate == 0 {
                    return Err(anyhow!("Tick rate must be at least 1 ms"));
                }
                self.ui.tick_rate_ms = rate;
            }

            // API key cannot be set via config
            "insight.api_key" | "api_key" => {
                return Err(anyhow!(
                    "API keys cannot be stored in configuration. \
                     Set the GEMINI_API_KEY or API_KEY environment variable instead."
                ));
            }

            _ => return Err(anyhow!("Unknown configuration key: {}", key)),
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = [
            "wikidata.base_url",
            "wikidata.commons_url",
            "wikidata.language",
            "wikidata.image_width",
            "wikidata.timeout_secs",
            "insight.base_url",
            "insight.analysis_model",
            "insight.insight_model",
            "insight.comparison_model",
            "insight.timeout_secs",
            "insight.api_key",
            "graph.link_distance",
            "graph.charge_strength",
            "graph.collision_radius",
            "graph.position_strength",
            "ui.theme",
            "ui.tick_rate_ms",
        ];

        keys.into_iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}
