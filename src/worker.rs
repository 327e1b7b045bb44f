use chrono_tz::Tz;
use serde_json::Value;
use log::{error, info, warn};
use thiserror::Error;
use crate::config::{Config, Labels};
use crate::formatting::{display_string, format_last_update, format_value, DateLocale};
use crate::manager_forecast::models::ForecastRecord;
use crate::manager_forecast::Forecast;
use crate::manager_page::Region;
use crate::templates::{ModelView, PanelTemplates, TemplateError};

/// Everything that decides how a record is shown, independent of where it comes from
pub struct RenderSettings {
    pub temperature_unit: String,
    pub wind_speed_unit: String,
    pub locale: DateLocale,
    pub time_zone: Tz,
    pub labels: Labels,
    pub templates: PanelTemplates,
}

impl RenderSettings {
    /// Returns render settings from configuration
    ///
    /// # Arguments
    ///
    /// * 'config' - configuration
    pub fn new(config: &Config) -> Result<RenderSettings, WorkerError> {
        let locale = config.display.locale.parse::<DateLocale>()
            .map_err(|e| WorkerError::SettingsError(e.to_string()))?;
        let time_zone = config.display.time_zone.parse::<Tz>()
            .map_err(|e| WorkerError::SettingsError(format!("time zone {}: {}", config.display.time_zone, e)))?;

        Ok(RenderSettings {
            temperature_unit: config.display.temperature_unit.clone(),
            wind_speed_unit: config.display.wind_speed_unit.clone(),
            locale,
            time_zone,
            labels: config.labels.clone(),
            templates: PanelTemplates::new()?,
        })
    }
}

/// Loads the forecast record and renders it into the two regions
///
/// Nothing escapes from here: a failed load ends up as an error message in the forecast
/// region, and a bad generation time only affects the last update label.
///
/// # Arguments
///
/// * 'forecast' - the forecast loader
/// * 'settings' - units, locale and labels to render with
/// * 'forecast_region' - region for the forecast panel
/// * 'last_update_region' - region for the last update label
pub fn run(forecast: &Forecast, settings: &RenderSettings, forecast_region: &mut impl Region, last_update_region: &mut impl Region) {
    let record = match forecast.load() {
        Ok(record) => record,
        Err(e) => {
            error!("error loading or processing forecast: {}", e);
            render_error(&e.to_string(), settings, forecast_region, last_update_region);
            return;
        },
    };

    match render_panel(&record, settings) {
        Ok(html) => {
            forecast_region.set_inner_html(html);
            last_update_region.set_text_content(&render_last_update(&record, settings));
            info!("forecast for {} rendered", record.forecast_date().map(display_string).unwrap_or_default());
        },
        Err(e) => {
            error!("error rendering forecast: {}", e);
            render_error(&e.to_string(), settings, forecast_region, last_update_region);
        },
    }
}

/// Replaces the panel with the error message and sets the last update label to the error placeholder
///
/// # Arguments
///
/// * 'detail' - the underlying failure message
/// * 'settings' - templates and labels
/// * 'forecast_region' - region for the forecast panel
/// * 'last_update_region' - region for the last update label
fn render_error(detail: &str, settings: &RenderSettings, forecast_region: &mut impl Region, last_update_region: &mut impl Region) {
    let labels = &settings.labels;
    match settings.templates.error(&labels.error_message, detail) {
        Ok(html) => forecast_region.set_inner_html(html),
        Err(e) => {
            error!("error rendering error message: {}", e);
            forecast_region.set_text_content(&format!("{} ({})", labels.error_message, detail));
        },
    }
    last_update_region.set_text_content(&labels.error);
}

/// Renders the forecast panel markup for a record
///
/// # Arguments
///
/// * 'record' - a validated forecast record
/// * 'settings' - units, labels and templates
fn render_panel(record: &ForecastRecord, settings: &RenderSettings) -> Result<String, TemplateError> {
    let labels = &settings.labels;
    let model = |name: &str, temp: Option<&Value>, wind: Option<&Value>| ModelView {
        name: name.to_string(),
        temperature: format_value(temp, &settings.temperature_unit, &labels.not_available),
        wind_speed: format_value(wind, &settings.wind_speed_unit, &labels.not_available),
    };

    let models = [
        model(&labels.rf_model, record.rf_temp_c(), record.rf_wspd_kmh()),
        model(&labels.xgb_model, record.xgb_temp_c(), record.xgb_wspd_kmh()),
    ];
    let date = record.forecast_date().map(display_string).unwrap_or_default();

    settings.templates.panel(&date, &models, labels)
}

/// Returns the text for the last update label, falling back to the unknown placeholder
///
/// # Arguments
///
/// * 'record' - a validated forecast record
/// * 'settings' - locale, time zone and labels
fn render_last_update(record: &ForecastRecord, settings: &RenderSettings) -> String {
    match format_last_update(record.generated_at(), settings.locale, settings.time_zone) {
        Ok(s) => s,
        Err(e) => {
            warn!("error parsing generation time of forecast: {}", e);
            settings.labels.unknown.clone()
        },
    }
}

/// Error depicting errors that occur while preparing to render
///
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("error while creating render settings: {0:?}")]
    SettingsError(String),
    #[error("TemplateError: {0}")]
    TemplateError(#[from] TemplateError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::{MockServer, ResponseTemplate};
    use crate::config::Display;
    use crate::manager_forecast::tests::{mount, sample_record, source};
    use crate::manager_page::ElementRegion;

    fn settings() -> RenderSettings {
        let display = Display::default();
        RenderSettings {
            temperature_unit: display.temperature_unit,
            wind_speed_unit: display.wind_speed_unit,
            locale: DateLocale::De,
            time_zone: chrono_tz::Europe::Berlin,
            labels: Labels::default(),
            templates: PanelTemplates::new().unwrap(),
        }
    }

    fn record(value: Value) -> ForecastRecord {
        match value {
            Value::Object(fields) => ForecastRecord::new(fields),
            _ => panic!("test record must be an object"),
        }
    }

    /// Runs a full load and render against the mock server, twice when asked to
    async fn render_from(server: &MockServer, runs: usize) -> (ElementRegion, ElementRegion) {
        let config = source(format!("{}/meteoflow/", server.uri()));
        tokio::task::spawn_blocking(move || {
            let forecast = Forecast::new(&config).unwrap();
            let settings = settings();
            let mut panel = ElementRegion::new("forecast");
            let mut label = ElementRegion::new("last-update");
            for _ in 0..runs {
                run(&forecast, &settings, &mut panel, &mut label);
            }
            (panel, label)
        })
        .await
        .unwrap()
    }

    fn config(locale: &str, time_zone: &str) -> Config {
        toml::from_str(&format!(r#"
            [forecast]
            page_url = "https://example.org/meteoflow/"

            [display]
            locale = "{}"
            time_zone = "{}"

            [page]
            path = "index.html"

            [general]
            log_path = "/tmp/forecast_panel.log"
            log_level = "info"
            log_to_stdout = false
        "#, locale, time_zone)).unwrap()
    }

    #[test]
    fn settings_from_config() {
        let settings = RenderSettings::new(&config("en-GB", "Europe/London")).unwrap();
        assert_eq!(settings.locale, DateLocale::EnGb);
        assert_eq!(settings.time_zone, chrono_tz::Europe::London);
        assert_eq!(settings.temperature_unit, "°C");

        assert!(matches!(RenderSettings::new(&config("fr-FR", "Europe/Berlin")), Err(WorkerError::SettingsError(_))));
        assert!(matches!(RenderSettings::new(&config("de-DE", "Europe/Atlantis")), Err(WorkerError::SettingsError(_))));
    }

    #[test]
    fn panel_shows_date_and_both_models() {
        let html = render_panel(&record(sample_record()), &settings()).unwrap();

        // slashes come out as &#x2F; from the template escaper
        assert!(html.contains("<h2>Forecast for: 2025-04-07</h2>"));
        assert!(html.contains("<h3>Random Forest</h3>"));
        assert!(html.contains("<h3>XGBoost</h3>"));
        assert!(html.contains("<p>Temperature: <strong>12.3°C</strong></p>"));
        assert!(html.contains("<p>Wind speed: <strong>14.1 km&#x2F;h</strong></p>"));
        assert!(html.contains("<p>Temperature: <strong>12.0°C</strong></p>"));
        assert!(html.contains("<p>Wind speed: <strong>N&#x2F;A</strong></p>"));
    }

    #[test]
    fn panel_with_zero_and_missing_values() {
        let html = render_panel(&record(json!({"forecast_date": "2025-04-07", "rf_temp_c": 0, "xgb_temp_c": 21.05})), &settings()).unwrap();

        assert!(html.contains("<strong>0.0°C</strong>"));
        assert!(html.contains("<strong>21.1°C</strong>"));
        assert_eq!(html.matches(&format!("<strong>{}</strong>", tera::escape_html("N/A"))).count(), 2);
    }

    #[test]
    fn panel_escapes_record_content() {
        let html = render_panel(&record(json!({"forecast_date": "<script>alert('x')</script>", "rf_temp_c": "a&b", "xgb_wspd_kmh": ["<i>", 2]})), &settings()).unwrap();

        assert!(html.contains("Forecast for: &lt;script&gt;alert(&#x27;x&#x27;)&lt;&#x2F;script&gt;</h2>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<strong>a&amp;b°C</strong>"));
        assert!(html.contains("<strong>&lt;i&gt;,2 km&#x2F;h</strong>"));
    }

    #[test]
    fn last_update_placeholder_on_bad_date() {
        assert_eq!(render_last_update(&record(json!({"forecast_date": "x", "generated_at": "nie"})), &settings()), "Unbekannt");
        assert_eq!(render_last_update(&record(json!({"forecast_date": "x"})), &settings()), "Unbekannt");
        assert_eq!(render_last_update(&record(sample_record()), &settings()), "06.04.2025, 16:43:25");
    }

    #[tokio::test]
    async fn renders_loaded_record() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(200).set_body_json(sample_record())).await;

        let (panel, label) = render_from(&server, 1).await;
        assert!(panel.inner_html().contains("2025-04-07"));
        assert_eq!(label.inner_html(), "06.04.2025, 16:43:25");
    }

    #[tokio::test]
    async fn not_found_renders_error_state() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(404)).await;

        let (panel, label) = render_from(&server, 1).await;
        assert!(panel.inner_html().starts_with("<p class=\"error\">"));
        assert!(panel.inner_html().contains("404"));
        assert_eq!(label.inner_html(), "Fehler");
    }

    #[tokio::test]
    async fn invalid_json_replaces_whole_panel() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(200).set_body_string("{not json")).await;

        let config = source(format!("{}/meteoflow/", server.uri()));
        let (panel, label) = tokio::task::spawn_blocking(move || {
            let forecast = Forecast::new(&config).unwrap();
            let mut panel = ElementRegion::new("forecast");
            let mut label = ElementRegion::new("last-update");
            panel.set_inner_html("<h2>stale</h2>".into());
            label.set_text_content("gestern");
            run(&forecast, &settings(), &mut panel, &mut label);
            (panel, label)
        })
        .await
        .unwrap();

        assert!(panel.inner_html().contains("ParseError"));
        assert!(!panel.inner_html().contains("stale"));
        assert_eq!(label.inner_html(), "Fehler");
    }

    #[tokio::test]
    async fn unparseable_generation_time_keeps_panel() {
        let server = MockServer::start().await;
        let mut body = sample_record();
        body["generated_at"] = json!("kaputt");
        mount(&server, ResponseTemplate::new(200).set_body_json(body)).await;

        let (panel, label) = render_from(&server, 1).await;
        assert!(panel.inner_html().contains("<h2>Forecast for: 2025-04-07</h2>"));
        assert_eq!(label.inner_html(), "Unbekannt");
    }

    #[tokio::test]
    async fn rendering_twice_gives_same_content() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(200).set_body_json(sample_record())).await;

        let (once_panel, once_label) = render_from(&server, 1).await;
        let (twice_panel, twice_label) = render_from(&server, 2).await;
        assert_eq!(once_panel.inner_html(), twice_panel.inner_html());
        assert_eq!(once_label.inner_html(), twice_label.inner_html());
    }
}
