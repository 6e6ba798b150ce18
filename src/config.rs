//! Configuration management

use crate::ingester::SpreadsheetLayout;
use crate::types::SourceMode;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Spreadsheet drop folder
    pub xlsx_dir: PathBuf,
    /// JSON drop folder (YYYYMMDD.json)
    pub json_dir: PathBuf,
    /// Mode used when a request names no source
    pub default_mode: SourceMode,
    /// Spreadsheet file extension, including the dot
    pub xlsx_extension: String,
    /// Header rows, column positions and category filter of the spreadsheet
    pub layout: SpreadsheetLayout,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Disable to recompute every request
    pub enabled: bool,
    /// Lifetime of a cached series in seconds
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Config {
    /// Load configuration from file, with `DAM__*` environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(Self::environment())
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }

    /// Defaults plus `DAM__*` environment overrides
    pub fn from_env() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(Self::environment())
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }

    /// Load from default locations, falling back to the environment alone
    pub fn load_default() -> anyhow::Result<Self> {
        let paths = [
            "dam-series.toml",
            "dam-series.yaml",
            "~/.config/dam-series/config.toml",
        ];

        for path in paths {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                return Self::load(expanded.as_ref());
            }
        }

        tracing::debug!("No configuration file found, using defaults");
        Self::from_env()
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix("DAM")
            .separator("__")
            .try_parsing(true)
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            xlsx_dir: PathBuf::from("uploads/power-xlsx"),
            json_dir: PathBuf::from("uploads/power-json"),
            default_mode: SourceMode::Auto,
            xlsx_extension: ".xlsx".to_string(),
            layout: SpreadsheetLayout::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.sources.default_mode, SourceMode::Auto);
        assert_eq!(config.sources.xlsx_extension, ".xlsx");
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [sources]
            xlsx_dir = "/data/xlsx"
            default_mode = "JSON"

            [cache]
            ttl_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.sources.xlsx_dir, PathBuf::from("/data/xlsx"));
        assert_eq!(config.sources.json_dir, PathBuf::from("uploads/power-json"));
        assert_eq!(config.sources.default_mode, SourceMode::Json);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl_secs, 5);
    }

    #[test]
    fn test_spreadsheet_layout_section() {
        let config: Config = toml::from_str(
            r#"
            [sources.layout]
            volume_col = 3
            category = "GR"
            "#,
        )
        .unwrap();

        let layout = &config.sources.layout;
        assert_eq!(layout.volume_col, 3);
        assert_eq!(layout.category, "GR");
        assert_eq!(layout.header_rows, 3);
        assert_eq!(layout.price_col, 2);
    }

    #[test]
    fn test_unknown_default_mode_rejected() {
        let result: Result<Config, _> = toml::from_str(
            r#"
            [sources]
            default_mode = "csv"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[sources]\njson_dir = \"/data/json\"\n\n[cache]\nenabled = false"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.sources.json_dir, PathBuf::from("/data/json"));
        assert_eq!(config.sources.xlsx_dir, PathBuf::from("uploads/power-xlsx"));
        assert!(!config.cache.enabled);
    }
}
