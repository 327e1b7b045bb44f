use std::fs;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Deserialize)]
pub struct ForecastSource {
    pub page_url: String,
    #[serde(default = "default_data_path")]
    pub data_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Deserialize)]
#[serde(default)]
pub struct Display {
    pub temperature_unit: String,
    pub wind_speed_unit: String,
    pub locale: String,
    pub time_zone: String,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            temperature_unit: "°C".into(),
            wind_speed_unit: " km/h".into(),
            locale: "de-DE".into(),
            time_zone: "Europe/Berlin".into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Labels {
    pub forecast_for: String,
    pub rf_model: String,
    pub xgb_model: String,
    pub temperature: String,
    pub wind_speed: String,
    pub not_available: String,
    pub unknown: String,
    pub error: String,
    pub error_message: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            forecast_for: "Forecast for".into(),
            rf_model: "Random Forest".into(),
            xgb_model: "XGBoost".into(),
            temperature: "Temperature".into(),
            wind_speed: "Wind speed".into(),
            not_available: "N/A".into(),
            unknown: "Unbekannt".into(),
            error: "Fehler".into(),
            error_message: "Error: the forecast could not be loaded or processed.".into(),
        }
    }
}

#[derive(Deserialize)]
pub struct Page {
    pub path: String,
    #[serde(default = "default_forecast_id")]
    pub forecast_id: String,
    #[serde(default = "default_last_update_id")]
    pub last_update_id: String,
}

#[derive(Deserialize)]
pub struct General {
    pub log_path: String,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
}

#[derive(Deserialize)]
pub struct Config {
    pub forecast: ForecastSource,
    #[serde(default)]
    pub display: Display,
    #[serde(default)]
    pub labels: Labels,
    pub page: Page,
    pub general: General,
}

fn default_data_path() -> String {
    "prediction.json".into()
}

const fn default_timeout_secs() -> u64 {
    30
}

fn default_forecast_id() -> String {
    "forecast".into()
}

fn default_last_update_id() -> String {
    "last-update".into()
}

/// Loads the configuration file and returns a struct with all configuration items
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, LoadConfigurationError> {
    let toml = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&toml)?;

    Ok(config)
}

/// Error depicting errors that occur while loading the configuration
///
#[derive(Debug, Error)]
pub enum LoadConfigurationError {
    #[error("FileError: {0}")]
    File(#[from] std::io::Error),
    #[error("TomlError: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [forecast]
        page_url = "https://example.org/meteoflow/"

        [page]
        path = "index.html"

        [general]
        log_path = "/tmp/forecast_panel.log"
        log_level = "info"
        log_to_stdout = false
    "#;

    #[test]
    fn minimal_config_gets_defaults() {
        let config: Config = toml::from_str(MINIMAL).unwrap();

        assert_eq!(config.forecast.data_path, "prediction.json");
        assert_eq!(config.forecast.timeout_secs, 30);
        assert_eq!(config.display.temperature_unit, "°C");
        assert_eq!(config.display.wind_speed_unit, " km/h");
        assert_eq!(config.display.locale, "de-DE");
        assert_eq!(config.display.time_zone, "Europe/Berlin");
        assert_eq!(config.labels.not_available, "N/A");
        assert_eq!(config.labels.unknown, "Unbekannt");
        assert_eq!(config.labels.error, "Fehler");
        assert_eq!(config.page.forecast_id, "forecast");
        assert_eq!(config.page.last_update_id, "last-update");
        assert_eq!(config.general.log_level, LevelFilter::Info);
    }

    #[test]
    fn partial_display_section_keeps_other_defaults() {
        let toml = format!("{}\n[display]\nlocale = \"en-GB\"\n", MINIMAL);
        let config: Config = toml::from_str(&toml).unwrap();

        assert_eq!(config.display.locale, "en-GB");
        assert_eq!(config.display.time_zone, "Europe/Berlin");
    }
}
