pub mod models;

use std::time::Duration;
use chrono::Utc;
use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::Url;
use serde_json::Value;
use thiserror::Error;
use crate::config::ForecastSource;
use crate::formatting::is_truthy;
use crate::manager_forecast::models::ForecastRecord;

/// Struct for loading the published forecast record
pub struct Forecast {
    client: Client,
    data_url: Url,
}

impl Forecast {
    /// Returns a forecast struct ready for loading forecast records
    ///
    /// # Arguments
    ///
    /// * 'config' - forecast source configuration
    pub fn new(config: &ForecastSource) -> Result<Forecast, ForecastError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let page_url = Url::parse(&config.page_url)
            .map_err(|e| ForecastError::UrlError(format!("page url {}: {}", config.page_url, e)))?;
        let data_url = page_url.join(&config.data_path)
            .map_err(|e| ForecastError::UrlError(format!("data path {}: {}", config.data_path, e)))?;

        Ok(Forecast {
            client,
            data_url,
        })
    }

    /// Loads and validates the forecast record
    ///
    /// A timestamp is added to the query so that no cache between us and the
    /// publisher hands back an old copy.
    pub fn load(&self) -> Result<ForecastRecord, ForecastError> {
        let request = self.client
            .get(self.data_url.clone())
            .query(&[("t", Utc::now().timestamp_millis())])
            .build()?;

        info!("loading forecast from {}", request.url());

        let response = self.client.execute(request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForecastError::HttpError {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let json = response.text()?;

        let value: Value = serde_json::from_str(&json)
            .map_err(|e| ForecastError::ParseError(e.to_string()))?;

        debug!("raw forecast data: {}", value);

        validate(value)
    }
}

/// Checks that the parsed document is an object with a forecast date set
///
/// # Arguments
///
/// * 'value' - the parsed document
fn validate(value: Value) -> Result<ForecastRecord, ForecastError> {
    let Value::Object(fields) = value else {
        return Err(ForecastError::ValidationError("forecast data is not an object".into()));
    };

    let record = ForecastRecord::new(fields);
    if !record.forecast_date().is_some_and(is_truthy) {
        return Err(ForecastError::ValidationError("forecast data is invalid, empty or the date is missing".into()));
    }

    Ok(record)
}

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("UrlError: {0}")]
    UrlError(String),
    #[error("HTTP error! Status: {status} - {reason}")]
    HttpError { status: u16, reason: String },
    #[error("ParseError: {0}")]
    ParseError(String),
    #[error("ValidationError: {0}")]
    ValidationError(String),
    #[error("NetworkError: {0}")]
    NetworkError(#[from] reqwest::Error),
}
