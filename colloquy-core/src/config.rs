//! Configuration types for Colloquy

use serde::{Deserialize, Serialize};

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColloquyConfig {
    /// LLM provider configuration (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm: Option<LLMProviderConfig>,

    /// Title generation settings
    #[serde(default)]
    pub title: TitleConfig,
}

/// LLM provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LLMProviderConfig {
    /// Provider type
    pub provider: LLMProvider,

    /// Model name
    pub model: String,

    /// API key (if needed, prefer env vars)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL (for OpenAI-compatible endpoints)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// LLM provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LLMProvider {
    /// Scripted provider with no network access
    Stub,
    OpenAI,
}

/// Title generation settings.
///
/// These are read by callers deciding whether and how to show a title; the
/// generator itself never truncates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleConfig {
    /// Generate titles for new sessions
    #[serde(default = "default_title_enabled")]
    pub enabled: bool,

    /// Maximum title length to display
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_chars: Option<usize>,
}

fn default_title_enabled() -> bool {
    true
}

impl Default for TitleConfig {
    fn default() -> Self {
        Self {
            enabled: default_title_enabled(),
            max_chars: None,
        }
    }
}

impl ColloquyConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Loads in this order:
    /// 1. Default configuration
    /// 2. Configuration file (colloquy.toml)
    /// 3. Environment variable overrides (`COLLOQUY_` prefix, `__` nesting)
    /// 4. File named by `COLLOQUY_CONFIG_PATH`, if set
    ///
    /// # Errors
    ///
    /// Returns an error if configuration file is invalid.
    pub fn load() -> crate::error::Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Serialized, Toml},
        };

        let mut figment = Figment::from(Serialized::defaults(ColloquyConfig::default()))
            .merge(Toml::file("colloquy.toml"))
            .merge(Env::prefixed("COLLOQUY_").ignore(&["CONFIG_PATH"]).split("__"));

        if let Ok(path) = std::env::var("COLLOQUY_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }

        let config: ColloquyConfig = figment.extract().map_err(|e| {
            crate::error::ColloquyError::Configuration(format!(
                "Failed to load configuration: {}",
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::error::Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Serialized, Toml},
        };

        let config: ColloquyConfig = Figment::from(Serialized::defaults(ColloquyConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .extract()
            .map_err(|e| {
                crate::error::ColloquyError::Configuration(format!(
                    "Failed to load configuration file: {}",
                    e
                ))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> crate::error::Result<()> {
        if let Some(llm) = &self.llm {
            if llm.model.trim().is_empty() && llm.provider != LLMProvider::Stub {
                return Err(crate::error::ColloquyError::Configuration(
                    "llm.model must not be empty".to_string(),
                ));
            }
        }
        if self.title.max_chars == Some(0) {
            return Err(crate::error::ColloquyError::Configuration(
                "title.max_chars must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = ColloquyConfig::default();
        assert!(config.llm.is_none());
        assert!(config.title.enabled);
        assert_eq!(config.title.max_chars, None);
    }

    #[test]
    fn test_from_file() {
        let file = write_config(
            r#"
[llm]
provider = "openai"
model = "gpt-4o-mini"
base_url = "http://localhost:11434/v1"

[title]
max_chars = 50
"#,
        );

        let config = ColloquyConfig::from_file(file.path()).unwrap();
        let llm = config.llm.unwrap();
        assert_eq!(llm.provider, LLMProvider::OpenAI);
        assert_eq!(llm.model, "gpt-4o-mini");
        assert_eq!(llm.base_url.as_deref(), Some("http://localhost:11434/v1"));
        assert!(config.title.enabled);
        assert_eq!(config.title.max_chars, Some(50));
    }

    #[test]
    fn test_empty_model_rejected() {
        let file = write_config(
            r#"
[llm]
provider = "openai"
model = ""
"#,
        );

        let err = ColloquyConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, crate::error::ColloquyError::Configuration(_)));
    }

    #[test]
    fn test_zero_max_chars_rejected() {
        let config = ColloquyConfig {
            title: TitleConfig {
                enabled: true,
                max_chars: Some(0),
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let file = write_config(
            r#"
[llm]
provider = "carrier-pigeon"
model = "x"
"#,
        );
        assert!(ColloquyConfig::from_file(file.path()).is_err());
    }
}
