use serde_json::{Map, Value};

pub const FORECAST_DATE: &str = "forecast_date";
pub const RF_TEMP_C: &str = "rf_temp_c";
pub const RF_WSPD_KMH: &str = "rf_wspd_kmh";
pub const XGB_TEMP_C: &str = "xgb_temp_c";
pub const XGB_WSPD_KMH: &str = "xgb_wspd_kmh";
pub const GENERATED_AT: &str = "generated_at";

/// One day of predictions from the Random Forest and XGBoost models
///
/// Kept as the raw JSON object since the producer makes no promises about
/// the types of the prediction fields.
#[derive(Debug, Clone)]
pub struct ForecastRecord {
    fields: Map<String, Value>,
}

impl ForecastRecord {
    pub fn new(fields: Map<String, Value>) -> ForecastRecord {
        ForecastRecord { fields }
    }

    pub fn forecast_date(&self) -> Option<&Value> {
        self.fields.get(FORECAST_DATE)
    }

    pub fn rf_temp_c(&self) -> Option<&Value> {
        self.fields.get(RF_TEMP_C)
    }

    pub fn rf_wspd_kmh(&self) -> Option<&Value> {
        self.fields.get(RF_WSPD_KMH)
    }

    pub fn xgb_temp_c(&self) -> Option<&Value> {
        self.fields.get(XGB_TEMP_C)
    }

    pub fn xgb_wspd_kmh(&self) -> Option<&Value> {
        self.fields.get(XGB_WSPD_KMH)
    }

    pub fn generated_at(&self) -> Option<&Value> {
        self.fields.get(GENERATED_AT)
    }
}
