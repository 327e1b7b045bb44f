use std::env;
use log::info;
use thiserror::Error;
use crate::config::{load_config, Config, LoadConfigurationError};
use crate::logging::{setup_logger, LoggerError};
use crate::manager_forecast::{Forecast, ForecastError};
use crate::manager_page::{HtmlPage, PageError};
use crate::worker::{RenderSettings, WorkerError};

pub struct Mgr {
    pub forecast: Forecast,
    pub settings: RenderSettings,
    pub page: HtmlPage,
}

/// Initializes and returns configuration and a Mgr struct holding the loader, render settings and page
///
pub fn init() -> Result<(Config, Mgr), InitializationError> {
    let config_path = config_path(env::args())?;

    // Load configuration
    let config = load_config(&config_path)?;

    // Setup logging
    let _ = setup_logger(&config.general.log_path, config.general.log_level, config.general.log_to_stdout)?;

    // Print version
    info!("starting forecast panel version: {}", env!("CARGO_PKG_VERSION"));

    // Instantiate structs
    let forecast = Forecast::new(&config.forecast)?;
    let settings = RenderSettings::new(&config)?;
    let page = HtmlPage::load(&config.page.path)?;

    let mgr = Mgr {
        forecast,
        settings,
        page,
    };

    Ok((config, mgr))
}

/// Picks the configuration file path out of the program arguments
///
/// # Arguments
///
/// * 'args' - program arguments
fn config_path(args: impl Iterator<Item = String>) -> Result<String, InitializationError> {
    args.filter_map(|a| a.strip_prefix("--config=").map(str::to_string))
        .find(|p| !p.is_empty())
        .ok_or(InitializationError::ArgumentError("usage: forecast_panel --config=<path>".into()))
}

/// Error depicting errors that occur while initializing
///
#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("ArgumentError: {0}")]
    ArgumentError(String),
    #[error("ConfigurationError: {0}")]
    ConfigurationError(#[from] LoadConfigurationError),
    #[error("SetupLoggerError: {0}")]
    SetupLoggerError(#[from] LoggerError),
    #[error("ForecastSetupError: {0}")]
    ForecastSetupError(#[from] ForecastError),
    #[error("RenderSetupError: {0}")]
    RenderSetupError(#[from] WorkerError),
    #[error("PageSetupError: {0}")]
    PageSetupError(#[from] PageError),
}
