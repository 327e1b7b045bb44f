use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;
use crate::config::Labels;

const PANEL: &str = "forecast/panel.html";
const ERROR: &str = "forecast/error.html";

/// Templates compiled into the binary
mod embedded {
    pub const PANEL: &str = r#"
<h2>{{ labels.forecast_for }}: {{ forecast_date }}</h2>
{% for model in models -%}
<div class="prediction-box">
  <h3>{{ model.name }}</h3>
  <p>{{ labels.temperature }}: <strong>{{ model.temperature }}</strong></p>
  <p>{{ labels.wind_speed }}: <strong>{{ model.wind_speed }}</strong></p>
</div>
{% endfor -%}
"#;

    pub const ERROR: &str = r#"<p class="error">{{ message }} ({{ detail }})</p>"#;
}

/// One model's formatted prediction as shown in the panel
#[derive(Serialize)]
pub struct ModelView {
    pub name: String,
    pub temperature: String,
    pub wind_speed: String,
}

/// Markup templates for the forecast region, with HTML auto-escaping of every value
pub struct PanelTemplates {
    tera: Tera,
}

impl PanelTemplates {
    /// Compiles the embedded templates
    ///
    pub fn new() -> Result<PanelTemplates, TemplateError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);

        tera.add_raw_template(PANEL, embedded::PANEL)
            .map_err(|e| TemplateError::Compile(e.to_string()))?;
        tera.add_raw_template(ERROR, embedded::ERROR)
            .map_err(|e| TemplateError::Compile(e.to_string()))?;

        Ok(PanelTemplates { tera })
    }

    /// Renders the forecast panel
    ///
    /// # Arguments
    ///
    /// * 'forecast_date' - the date the forecast is for, as shown
    /// * 'models' - formatted predictions, in display order
    /// * 'labels' - headings and field labels
    pub fn panel(&self, forecast_date: &str, models: &[ModelView], labels: &Labels) -> Result<String, TemplateError> {
        let mut context = Context::new();
        context.insert("forecast_date", forecast_date);
        context.insert("models", models);
        context.insert("labels", labels);

        Ok(self.tera.render(PANEL, &context)?)
    }

    /// Renders the visible error message that replaces the panel
    ///
    /// # Arguments
    ///
    /// * 'message' - user facing message
    /// * 'detail' - the underlying failure
    pub fn error(&self, message: &str, detail: &str) -> Result<String, TemplateError> {
        let mut context = Context::new();
        context.insert("message", message);
        context.insert("detail", detail);

        Ok(self.tera.render(ERROR, &context)?)
    }
}

/// Error depicting errors that occur while compiling or rendering templates
///
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Compile: {0}")]
    Compile(String),
    #[error("Render: {0}")]
    Render(String),
}

impl From<tera::Error> for TemplateError {
    fn from(e: tera::Error) -> Self {
        TemplateError::Render(e.to_string())
    }
}
