use crate::core::currency::{CurrencyCode, default_currencies};
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// `GET /v6/latest/{BASE}` returning `result` and `rates`
    #[default]
    OpenErApi,
    /// `GET /v4/latest/{BASE}` returning bare `rates`
    ExchangerateApi,
}

impl ProviderKind {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenErApi => "https://open.er-api.com",
            ProviderKind::ExchangerateApi => "https://api.exchangerate-api.com",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default)]
    pub kind: ProviderKind,
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.kind.default_base_url())
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            kind: ProviderKind::default(),
            base_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_precision() -> usize {
    4
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default = "default_currencies")]
    pub currencies: Vec<CurrencyCode>,
    /// Decimal digits shown for converted amounts
    #[serde(default = "default_precision")]
    pub precision: usize,
    pub history_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            provider: ProviderConfig::default(),
            currencies: default_currencies(),
            precision: default_precision(),
            history_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, or built-in defaults
    /// when no config file has been set up yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("org", "fxconv", "fxconv")
            .context("Could not determine project directories")
    }

    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.yaml"))
    }

    pub fn history_file_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.history_path {
            return Ok(PathBuf::from(custom_path));
        }
        Ok(Self::project_dirs()?.data_dir().join("history.json"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.currencies.is_empty() {
            bail!("At least one currency must be configured");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
provider:
  kind: exchangerate_api
  base_url: "http://example.com/rates"
  timeout_secs: 2
currencies: ["usd", "CHF"]
precision: 2
history_path: "/tmp/fx-history.json"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.provider.kind, ProviderKind::ExchangerateApi);
        assert_eq!(config.provider.base_url(), "http://example.com/rates");
        assert_eq!(config.provider.timeout_secs, 2);
        let codes: Vec<&str> = config.currencies.iter().map(|c| c.as_str()).collect();
        assert_eq!(codes, ["USD", "CHF"]);
        assert_eq!(config.precision, 2);
        assert_eq!(
            config.history_file_path().unwrap(),
            PathBuf::from("/tmp/fx-history.json")
        );
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.provider.kind, ProviderKind::OpenErApi);
        assert_eq!(config.provider.base_url(), "https://open.er-api.com");
        assert_eq!(config.provider.timeout_secs, 5);
        assert_eq!(config.currencies, default_currencies());
        assert_eq!(config.precision, 4);
        assert!(config.history_path.is_none());
    }

    #[test]
    fn test_invalid_currency_is_rejected() {
        let result = serde_yaml::from_str::<AppConfig>("currencies: [\"dollars\"]");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_currency_list_fails_validation() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), "currencies: []").unwrap();
        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("At least one currency"));
    }
}
