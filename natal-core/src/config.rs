use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::houses::HouseSystem;
use crate::i18n::Language;
use crate::theme::Theme;

/// Zone applied to every birth time unless overridden. It is not derived
/// from the birth coordinates.
pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";

/// Optional chart defaults stored on disk.
///
/// Example TOML:
/// ```toml
/// theme = "dark"
/// language = "PT"
/// house_system = "placidus"
/// timezone = "America/Sao_Paulo"
/// ```
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// "light" or "dark". Defaults to dark.
    pub theme: Option<String>,

    /// "EN", "PT" or "ES". Defaults to PT.
    pub language: Option<String>,

    /// "placidus", "porphyry", "equal" or "whole-sign". Defaults to placidus.
    pub house_system: Option<String>,

    /// IANA timezone for birth times. Defaults to [`DEFAULT_TIMEZONE`].
    pub timezone: Option<String>,
}

impl Config {
    pub fn theme(&self) -> Result<Theme> {
        match &self.theme {
            Some(s) => Ok(Theme::try_from(s.as_str())?),
            None => Ok(Theme::default()),
        }
    }

    pub fn language(&self) -> Result<Language> {
        match &self.language {
            Some(s) => Ok(Language::try_from(s.as_str())?),
            None => Ok(Language::default()),
        }
    }

    pub fn house_system(&self) -> Result<HouseSystem> {
        match &self.house_system {
            Some(s) => Ok(HouseSystem::try_from(s.as_str())?),
            None => Ok(HouseSystem::default()),
        }
    }

    pub fn timezone(&self) -> &str {
        self.timezone.as_deref().unwrap_or(DEFAULT_TIMEZONE)
    }

    /// Load config from the platform config directory, or defaults if there is none.
    ///
    /// A platform without a resolvable home directory has no config file.
    pub fn load() -> Result<Self> {
        match Self::config_file_path() {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("no platform config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load config from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    /// Path to the config file, if the platform has a config directory.
    pub fn config_file_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "natal-chart", "natal-cli")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_the_fixed_chart_settings() {
        let cfg = Config::default();
        assert_eq!(cfg.theme().unwrap(), Theme::Dark);
        assert_eq!(cfg.language().unwrap(), Language::Pt);
        assert_eq!(cfg.house_system().unwrap(), HouseSystem::Placidus);
        assert_eq!(cfg.timezone(), "America/Sao_Paulo");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "language = \"en\"\nhouse_system = \"whole-sign\"\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.language().unwrap(), Language::En);
        assert_eq!(cfg.house_system().unwrap(), HouseSystem::WholeSign);
        assert_eq!(cfg.theme().unwrap(), Theme::Dark);
        assert_eq!(cfg.timezone(), DEFAULT_TIMEZONE);
    }

    #[test]
    fn malformed_file_reports_its_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "theme = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn unknown_values_surface_on_access() {
        let cfg = Config {
            theme: Some("sepia".into()),
            ..Config::default()
        };
        let err = cfg.theme().unwrap_err();
        assert!(err.to_string().contains("Unknown theme 'sepia'"));
    }

    #[test]
    fn full_file_overrides_every_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "theme = \"light\"\nlanguage = \"ES\"\nhouse_system = \"equal\"\ntimezone = \"Europe/Lisbon\"\n",
        )
        .unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.theme().unwrap(), Theme::Light);
        assert_eq!(cfg.language().unwrap(), Language::Es);
        assert_eq!(cfg.house_system().unwrap(), HouseSystem::Equal);
        assert_eq!(cfg.timezone(), "Europe/Lisbon");
    }

    #[test]
    fn config_path_ends_in_app_dir() {
        if let Some(path) = Config::config_file_path() {
            assert!(path.ends_with("config.toml"));
        }
    }
}
