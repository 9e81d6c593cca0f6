use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use chrono::Locale;
use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::FontChoice;

const DEFAULT_LOCALE: &str = "en_US";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML config: {0}")]
    TomlDecode(#[from] toml::de::Error),
    #[error("unknown locale: {0}")]
    UnknownLocale(String),
}

/// Per-instance widget settings as written by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WidgetConfig {
    pub font: Option<FontChoice>,
    pub show_background: Option<bool>,
    pub locale: Option<String>,
}

/// Settings after defaults and command-line overrides are applied.
#[derive(Debug, Clone, Copy)]
pub struct WidgetSettings {
    pub font: FontChoice,
    pub show_background: bool,
    pub locale: Locale,
}

impl WidgetConfig {
    pub fn settings(
        &self,
        font_override: Option<FontChoice>,
        hide_background: bool,
    ) -> Result<WidgetSettings, ConfigError> {
        let locale_name = self.locale.as_deref().unwrap_or(DEFAULT_LOCALE);
        let locale = Locale::try_from(locale_name)
            .map_err(|_| ConfigError::UnknownLocale(locale_name.to_string()))?;

        Ok(WidgetSettings {
            font: font_override.or(self.font).unwrap_or_default(),
            show_background: !hide_background && self.show_background.unwrap_or(true),
            locale,
        })
    }
}

pub fn load_config(path: &Path) -> Result<WidgetConfig, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("no config at {}, using defaults", path.display());
            return Ok(WidgetConfig::default());
        }
        Err(err) => return Err(ConfigError::Io(err)),
    };

    if raw.trim().is_empty() {
        return Ok(WidgetConfig::default());
    }

    let config: WidgetConfig = toml::from_str(&raw)?;
    debug!("loaded config from {}: {config:?}", path.display());
    Ok(config)
}
