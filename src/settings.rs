//! Dashboard settings persisted as JSON
//!
//! Every field has a default so older or partial files still load; a missing
//! file yields [`DashboardSettings::default`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

use crate::history::{
    CommandProvider, CsvProvider, EmbeddedProvider, FallbackProvider, HistoricalDataProvider, DEFAULT_COMMAND_TIMEOUT,
};
use crate::report::ExportFormat;

/// Allowed auto-refresh range in seconds
pub const MIN_REFRESH_INTERVAL_SECS: u32 = 1;
pub const MAX_REFRESH_INTERVAL_SECS: u32 = 60;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Where historical observations come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Built-in reference table
    #[default]
    Sample,
    /// CSV file at `dataPath`
    File,
    /// External program at `dataCommand` printing JSON
    Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NotificationSettings {
    pub email: bool,
    pub push: bool,
    pub reports: bool,
    pub alerts: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            reports: true,
            alerts: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplaySettings {
    pub compact_mode: bool,
    pub show_trends: bool,
    pub animations_enabled: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            compact_mode: false,
            show_trends: true,
            animations_enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub role: String,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: "Dashboard User".to_string(),
            email: String::new(),
            role: "Administrator".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardSettings {
    pub theme: Theme,
    /// Auto-refresh interval in seconds
    pub refresh_interval: u32,
    pub data_source: DataSource,
    pub data_path: Option<PathBuf>,
    pub data_command: Option<Vec<String>>,
    pub command_timeout_secs: u64,
    pub default_export_format: ExportFormat,
    pub notifications: NotificationSettings,
    pub user: UserProfile,
    pub display: DisplaySettings,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            refresh_interval: 5,
            data_source: DataSource::Sample,
            data_path: None,
            data_command: None,
            command_timeout_secs: DEFAULT_COMMAND_TIMEOUT.as_secs(),
            default_export_format: ExportFormat::Pdf,
            notifications: NotificationSettings::default(),
            user: UserProfile::default(),
            display: DisplaySettings::default(),
        }
    }
}

impl DashboardSettings {
    /// Load from `path`; a missing file gives the defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No settings file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let settings: Self = serde_json::from_str(&content).map_err(|source| SettingsError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Write pretty JSON to `path`, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SettingsError> {
        let path = path.as_ref();
        self.validate()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|source| SettingsError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Saved dashboard settings to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(MIN_REFRESH_INTERVAL_SECS..=MAX_REFRESH_INTERVAL_SECS).contains(&self.refresh_interval) {
            return Err(SettingsError::Invalid {
                field: "refreshInterval",
                reason: format!(
                    "{} is outside {}..={} seconds",
                    self.refresh_interval, MIN_REFRESH_INTERVAL_SECS, MAX_REFRESH_INTERVAL_SECS
                ),
            });
        }
        if self.command_timeout_secs == 0 {
            return Err(SettingsError::Invalid {
                field: "commandTimeoutSecs",
                reason: "must be at least one second".to_string(),
            });
        }
        match self.data_source {
            DataSource::File if self.data_path.is_none() => Err(SettingsError::Invalid {
                field: "dataPath",
                reason: "required when dataSource is `file`".to_string(),
            }),
            DataSource::Command if self.data_command.as_ref().map_or(true, |c| c.is_empty()) => {
                Err(SettingsError::Invalid {
                    field: "dataCommand",
                    reason: "required when dataSource is `command`".to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Provider for the configured data source, wrapped so failures fall back
    pub fn build_provider(&self, region: &str) -> Result<FallbackProvider, SettingsError> {
        self.validate()?;

        let inner: Box<dyn HistoricalDataProvider> = match (self.data_source, &self.data_path, &self.data_command) {
            (DataSource::File, Some(path), _) => Box::new(CsvProvider::new(path.clone(), region)),
            (DataSource::Command, _, Some(command)) => match command.split_first() {
                Some((program, args)) => {
                    Box::new(CommandProvider::new(program.clone(), args.to_vec()).with_timeout(self.command_timeout()))
                }
                None => Box::new(EmbeddedProvider),
            },
            _ => Box::new(EmbeddedProvider),
        };
        Ok(FallbackProvider::new(inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("data_nova_settings_{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let settings = DashboardSettings::load(temp_path("does_not_exist.json")).unwrap();
        assert_eq!(settings, DashboardSettings::default());
        assert_eq!(settings.refresh_interval, 5);
        assert_eq!(settings.default_export_format, ExportFormat::Pdf);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: DashboardSettings =
            serde_json::from_str(r#"{"theme": "dark", "display": {"compactMode": true}}"#).unwrap();
        assert_eq!(settings.theme, Theme::Dark);
        assert!(settings.display.compact_mode);
        assert!(settings.display.show_trends);
        assert_eq!(settings.data_source, DataSource::Sample);
        assert!(settings.notifications.alerts);
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("roundtrip/settings.json");
        let mut settings = DashboardSettings::default();
        settings.theme = Theme::Dark;
        settings.refresh_interval = 30;
        settings.default_export_format = ExportFormat::Csv;

        settings.save(&path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"refreshInterval\": 30"));
        assert!(text.contains("\"defaultExportFormat\": \"csv\""));

        assert_eq!(DashboardSettings::load(&path).unwrap(), settings);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_validation() {
        let mut settings = DashboardSettings::default();
        settings.refresh_interval = 0;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::Invalid { field: "refreshInterval", .. })
        ));

        let mut settings = DashboardSettings::default();
        settings.data_source = DataSource::File;
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid { field: "dataPath", .. })));

        settings.data_path = Some(PathBuf::from("scores.csv"));
        assert!(settings.validate().is_ok());

        let mut settings = DashboardSettings::default();
        settings.data_source = DataSource::Command;
        settings.data_command = Some(Vec::new());
        assert!(settings.build_provider("lonoke-20800").is_err());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = temp_path("malformed.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(DashboardSettings::load(&path), Err(SettingsError::Json { .. })));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_build_provider_for_missing_file_falls_back() {
        let mut settings = DashboardSettings::default();
        settings.data_source = DataSource::File;
        settings.data_path = Some(temp_path("no_such_scores.csv"));

        let provider = settings.build_provider("lonoke-20800").unwrap();
        assert_eq!(provider.inner_name(), "csv");
        let series = provider.get_series("lonoke-20800").unwrap();
        assert_eq!(series.len(), 6);
    }
}
