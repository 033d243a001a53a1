//! Configuration management for logbook.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration directory name.
const CONFIG_DIR_NAME: &str = "logbook";

/// Environment variable prefix.
const ENV_PREFIX: &str = "LOGBOOK_";

/// Default worksheet holding the flights.
pub const DEFAULT_SHEET_NAME: &str = "Flights";

/// Commented template written by `logbook config init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# logbook configuration

[source]
# "xlsx" reads a local workbook, "google" reads a Google spreadsheet.
kind = "xlsx"
# Workbook path, used when kind = "xlsx".
file_name = "logbook.xlsx"
# Used when kind = "google".
# api_key = ""
# spreadsheet_id = ""
sheet_name = "Flights"
# First data row (1-based); rows above it are headers.
start_row = 20

[logbook]
owner = "Logbook Owner"
# Pages after which a new physical logbook starts, e.g. [96, 48].
page_breaks = []
# Newest flight first.
reverse = true
output = "logbook.pdf"

[map]
# Only flights whose date contains this text, e.g. "2023".
filter_date = ""
no_routes = false
# Airport database JSON; the bundled database is used when unset.
# airports_db = "airports.json"
output = "map.png"
width = 1920
height = 1080
"#;

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `LOGBOOK_`, sections separated by `__`)
/// 2. TOML config file at `~/.config/logbook/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where flights are read from.
    pub source: SourceConfig,
    /// PDF export settings.
    pub logbook: LogbookConfig,
    /// Map rendering settings.
    pub map: MapConfig,
}

/// Kind of flight data source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Local Excel workbook.
    #[default]
    Xlsx,
    /// Google Sheets v4 API.
    Google,
}

/// Source-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Which reader to use.
    pub kind: SourceKind,
    /// Workbook path for the `xlsx` source.
    pub file_name: Option<PathBuf>,
    /// API key for the `google` source.
    pub api_key: Option<String>,
    /// Spreadsheet id for the `google` source.
    pub spreadsheet_id: Option<String>,
    /// Worksheet name.
    pub sheet_name: String,
    /// First data row, 1-based.
    pub start_row: u32,
}

/// PDF export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogbookConfig {
    /// Name printed in the certification block.
    pub owner: String,
    /// Page numbers after which a new logbook starts.
    pub page_breaks: Vec<u32>,
    /// Write the newest flight first.
    pub reverse: bool,
    /// Output PDF path.
    pub output: PathBuf,
}

/// Map rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Date substring filter. Empty keeps every flight.
    pub filter_date: String,
    /// Draw airports only.
    pub no_routes: bool,
    /// Airport database JSON replacing the bundled one.
    pub airports_db: Option<PathBuf>,
    /// Output PNG path.
    pub output: PathBuf,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Xlsx,
            file_name: None,
            api_key: None,
            spreadsheet_id: None,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            start_row: 20,
        }
    }
}

impl Default for LogbookConfig {
    fn default() -> Self {
        Self {
            owner: "Logbook Owner".to_string(),
            page_breaks: Vec::new(),
            reverse: true,
            output: PathBuf::from("logbook.pdf"),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            filter_date: String::new(),
            no_routes: false,
            airports_db: None,
            output: PathBuf::from("map.png"),
            width: 1920,
            height: 1080,
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `LOGBOOK_`)
    ///
    /// Loading does not validate; call [`Config::validate`] before touching a
    /// source.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        Ok(Self::figment(&config_file).extract()?)
    }

    /// The provider stack used by [`Config::load_from`].
    #[must_use]
    pub fn figment(config_file: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration for the selected source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigInvalid`] naming the first missing or invalid
    /// value.
    pub fn validate(&self) -> Result<()> {
        let source = &self.source;

        match source.kind {
            SourceKind::Xlsx => {
                let missing = source
                    .file_name
                    .as_deref()
                    .map_or(true, |p| p.as_os_str().is_empty());
                if missing {
                    return Err(Error::config_invalid(
                        "source.file_name is required for the xlsx source",
                    ));
                }
            }
            SourceKind::Google => {
                if is_blank(source.api_key.as_deref()) {
                    return Err(Error::config_invalid(
                        "source.api_key is required for the google source",
                    ));
                }
                if is_blank(source.spreadsheet_id.as_deref()) {
                    return Err(Error::config_invalid(
                        "source.spreadsheet_id is required for the google source",
                    ));
                }
            }
        }

        if source.start_row == 0 {
            return Err(Error::config_invalid(
                "source.start_row must be at least 1",
            ));
        }

        if source.sheet_name.trim().is_empty() {
            return Err(Error::config_invalid("source.sheet_name must not be empty"));
        }

        if self.map.width == 0 || self.map.height == 0 {
            return Err(Error::config_invalid(format!(
                "map size must be non-zero, got {}x{}",
                self.map.width, self.map.height
            )));
        }

        Ok(())
    }

    /// Write [`DEFAULT_CONFIG_TEMPLATE`] to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutputWrite`] if the file cannot be written.
    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| Error::OutputWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, DEFAULT_CONFIG_TEMPLATE).map_err(|source| Error::OutputWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn xlsx_config() -> Config {
        let mut config = Config::default();
        config.source.file_name = Some(PathBuf::from("logbook.xlsx"));
        config
    }

    fn google_config() -> Config {
        let mut config = Config::default();
        config.source.kind = SourceKind::Google;
        config.source.api_key = Some("key".to_string());
        config.source.spreadsheet_id = Some("sheet-id".to_string());
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.source.kind, SourceKind::Xlsx);
        assert_eq!(config.source.sheet_name, "Flights");
        assert_eq!(config.source.start_row, 20);
        assert!(config.logbook.reverse);
        assert!(config.logbook.page_breaks.is_empty());
        assert_eq!(config.logbook.output, PathBuf::from("logbook.pdf"));
        assert_eq!(config.map.output, PathBuf::from("map.png"));
        assert_eq!((config.map.width, config.map.height), (1920, 1080));
        assert!(config.map.airports_db.is_none());
    }

    #[test]
    fn test_validate_valid_configs() {
        assert!(xlsx_config().validate().is_ok());
        assert!(google_config().validate().is_ok());
    }

    #[test]
    fn test_validate_xlsx_requires_file_name() {
        let err = Config::default().validate().unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("file_name"));
    }

    #[test]
    fn test_validate_google_requires_credentials() {
        let mut config = google_config();
        config.source.api_key = Some("  ".to_string());
        assert!(config.validate().unwrap_err().to_string().contains("api_key"));

        let mut config = google_config();
        config.source.spreadsheet_id = None;
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("spreadsheet_id"));
    }

    #[test]
    fn test_validate_start_row() {
        let mut config = xlsx_config();
        config.source.start_row = 0;
        assert!(config.validate().unwrap_err().to_string().contains("start_row"));

        config.source.start_row = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_map_size() {
        let mut config = xlsx_config();
        config.map.width = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("logbook"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            [source]
            kind = "google"
            api_key = "abc"
            spreadsheet_id = "xyz"
            start_row = 3

            [logbook]
            owner = "J. Doe"
            page_breaks = [96, 48]
            reverse = false

            [map]
            airports_db = "my-airports.json"
            "#,
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.source.kind, SourceKind::Google);
        assert_eq!(config.source.api_key.as_deref(), Some("abc"));
        assert_eq!(config.source.start_row, 3);
        assert_eq!(config.source.sheet_name, "Flights");
        assert_eq!(config.logbook.owner, "J. Doe");
        assert_eq!(config.logbook.page_breaks, vec![96, 48]);
        assert!(!config.logbook.reverse);
        assert_eq!(
            config.map.airports_db,
            Some(PathBuf::from("my-airports.json"))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_kind_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[source]\nkind = \"csv\"\n").unwrap();

        let err = Config::load_from(Some(path)).unwrap_err();
        assert!(matches!(err, Error::ConfigLoad(_)));
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                "[source]\nfile_name = \"from-file.xlsx\"\n[logbook]\nowner = \"File Owner\"\n",
            )?;
            jail.set_env("LOGBOOK_LOGBOOK__OWNER", "Env Owner");
            jail.set_env("LOGBOOK_SOURCE__START_ROW", "5");

            let config: Config = Config::figment(Path::new("config.toml")).extract()?;
            assert_eq!(config.logbook.owner, "Env Owner");
            assert_eq!(config.source.start_row, 5);
            assert_eq!(
                config.source.file_name,
                Some(PathBuf::from("from-file.xlsx"))
            );
            Ok(())
        });
    }

    #[test]
    fn test_template_parses_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        Config::write_template(&path).unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.source.file_name, Some(PathBuf::from("logbook.xlsx")));
        assert_eq!(config.logbook.owner, "Logbook Owner");
        assert!(config.map.airports_db.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("start_row"));
        assert!(json.contains("\"xlsx\""));
    }
}
