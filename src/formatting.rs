use std::str::FromStr;
use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde_json::Value;
use thiserror::Error;

/// Locales we know the medium date and medium time patterns for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateLocale {
    De,
    EnGb,
    EnUs,
}

impl DateLocale {
    /// Medium date plus medium time, e.g. "06.04.2025, 16:43:25" for de-DE
    fn pattern(&self) -> &'static str {
        match self {
            DateLocale::De => "%d.%m.%Y, %H:%M:%S",
            DateLocale::EnGb => "%-d %b %Y, %H:%M:%S",
            DateLocale::EnUs => "%b %-d, %Y, %-I:%M:%S %p",
        }
    }
}

impl FromStr for DateLocale {
    type Err = DateFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "de-DE" | "de" => Ok(DateLocale::De),
            "en-GB" => Ok(DateLocale::EnGb),
            "en-US" | "en" => Ok(DateLocale::EnUs),
            _ => Err(DateFormatError(format!("unsupported locale: {}", s))),
        }
    }
}

/// Formats a possibly missing forecast value for display
///
/// Finite numbers are rounded to one decimal, any other present value is shown as is,
/// and null or missing values give the placeholder. The unit is appended to anything but the placeholder.
///
/// # Arguments
///
/// * 'value' - the raw value from the forecast record
/// * 'unit' - unit suffix, e.g. "°C" or " km/h"
/// * 'placeholder' - what to show when there is no value
pub fn format_value(value: Option<&Value>, unit: &str, placeholder: &str) -> String {
    match value {
        None | Some(Value::Null) => placeholder.to_string(),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) if f.is_finite() => format!("{}{}", one_decimal(f), unit),
            _ => format!("{}{}", n, unit),
        },
        Some(v) => format!("{}{}", display_string(v), unit),
    }
}

/// Rounds to one decimal the way a browser's toFixed(1) does: exact ties go away from zero
/// and negative zero is printed without sign
///
/// # Arguments
///
/// * 'value' - a finite number
fn one_decimal(value: f64) -> String {
    if value == 0.0 {
        return "0.0".into();
    }

    // From 1e21 on a browser gives up on fixed notation
    if value.abs() >= 1e21 {
        return format!("{:e}", value).replacen('e', "e+", 1);
    }

    // Only multiples of 0.25 with an odd quarter count sit exactly on a tie at one decimal
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        format!("{:.1}", (value * 10.0).round() / 10.0)
    } else {
        format!("{:.1}", value)
    }
}

/// Returns the text a value shows as when interpolated into the page
///
/// # Arguments
///
/// * 'value' - any JSON value
pub fn display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(a) => a.iter().map(display_string).collect::<Vec<String>>().join(","),
        Value::Object(_) => "[object Object]".into(),
    }
}

/// Returns whether a value counts as set, i.e. is not null, false, zero, NaN or an empty string
///
/// # Arguments
///
/// * 'value' - any JSON value
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Formats the time a forecast record was generated for the last update label
///
/// # Arguments
///
/// * 'generated_at' - raw generated_at value from the record
/// * 'locale' - locale to format for
/// * 'tz' - time zone to show the time in
pub fn format_last_update(generated_at: Option<&Value>, locale: DateLocale, tz: Tz) -> Result<String, DateFormatError> {
    let date_time = match generated_at {
        Some(Value::String(s)) => parse_date_time(s, tz)?,
        Some(Value::Number(n)) => {
            let millis = n.as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
                .ok_or(DateFormatError(format!("not a timestamp: {}", n)))?;
            DateTime::from_timestamp_millis(millis)
                .ok_or(DateFormatError(format!("timestamp out of range: {}", millis)))?
        },
        Some(v) => return Err(DateFormatError(format!("not a date: {}", v))),
        None => return Err(DateFormatError("missing".into())),
    };

    Ok(date_time.with_timezone(&tz).format(locale.pattern()).to_string())
}

/// Parses a date time string in one of the ISO flavours a producer may write
///
/// Strings with an offset are taken as is, naive date times are taken to be in the
/// display time zone and a bare date is taken as midnight UTC.
///
/// # Arguments
///
/// * 'input' - the string to parse
/// * 'tz' - time zone for naive date times
fn parse_date_time(input: &str, tz: Tz) -> Result<DateTime<Utc>, DateFormatError> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
            return match tz.from_local_datetime(&naive) {
                LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Ok(dt.with_timezone(&Utc)),
                LocalResult::None => {
                    // Inside a spring forward gap; keep the offset from before the jump,
                    // which moves the time forward by the size of the gap
                    let before = tz.offset_from_utc_datetime(&(naive - TimeDelta::days(1))).fix();
                    before.from_local_datetime(&naive)
                        .single()
                        .map(|dt| dt.with_timezone(&Utc))
                        .ok_or(DateFormatError(format!("non-existent local time: {}", input)))
                },
            };
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }

    Err(DateFormatError(format!("unparseable date: {}", input)))
}

/// Error depicting a generated_at value that could not be turned into a readable date
///
#[derive(Debug, Error)]
#[error("DateFormatError: {0}")]
pub struct DateFormatError(pub String);
