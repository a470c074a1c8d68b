//! Hijri and Gregorian calendar conversion
//!
//! Conversions follow the Umm al-Qura calendar and are delegated to a
//! generative language model held to a strict JSON response schema. The
//! [`CalendarConverter`] trait keeps the network client swappable.

use std::fmt;

use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{Result, TanbihError};
use tanbih_common::format_date;

const MODEL: &str = "gemini-2.5-flash";
const ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Response schema for a plain date conversion
static DATE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "OBJECT",
        "properties": {
            "year": { "type": "INTEGER" },
            "month": { "type": "INTEGER" },
            "day": { "type": "INTEGER" },
            "monthName": { "type": "STRING" }
        },
        "required": ["year", "month", "day", "monthName"]
    })
});

/// Response schema for today's date, which also names the weekday
static TODAY_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "OBJECT",
        "properties": {
            "year": { "type": "INTEGER" },
            "month": { "type": "INTEGER" },
            "day": { "type": "INTEGER" },
            "monthName": { "type": "STRING" },
            "weekdayName": { "type": "STRING" }
        },
        "required": ["year", "month", "day", "monthName", "weekdayName"]
    })
});

/// A date as reported by the conversion service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertedDate {
    /// Calendar year
    pub year: i32,
    /// Month number, 1-based
    pub month: u32,
    /// Day of month, 1-based
    pub day: u32,
    /// Month name in Arabic
    pub month_name: String,
    /// Weekday name in Arabic; only today's date carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday_name: Option<String>,
}

impl fmt::Display for ConvertedDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(weekday) = &self.weekday_name {
            write!(f, "{weekday}، ")?;
        }
        write!(f, "{} {} {}", self.day, self.month_name, self.year)
    }
}

/// Calendar conversion operations
#[async_trait]
pub trait CalendarConverter: Send + Sync {
    /// Today's date in the Hijri calendar
    async fn today_hijri(&self) -> Result<ConvertedDate>;

    /// A Gregorian date converted to Hijri
    async fn to_hijri(&self, date: NaiveDate) -> Result<ConvertedDate>;

    /// A Hijri date converted to Gregorian
    async fn to_gregorian(&self, year: i32, month: u32, day: u32) -> Result<ConvertedDate>;
}

/// [`CalendarConverter`] backed by the Gemini generateContent endpoint
pub struct GeminiConverter {
    client: reqwest::Client,
    api_key: String,
}

impl GeminiConverter {
    /// Converter using `api_key` for every request
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Converter keyed from `GEMINI_API_KEY`, falling back to the older
    /// `API_KEY` name.
    ///
    /// # Errors
    /// `Configuration` when neither variable is set.
    pub fn from_env() -> Result<Self> {
        std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .map(Self::new)
            .map_err(|_| TanbihError::configuration("GEMINI_API_KEY is not set"))
    }

    async fn generate(&self, prompt: &str, schema: &Value) -> Result<ConvertedDate> {
        debug!(model = MODEL, "requesting calendar conversion");
        let url = format!("{ENDPOINT}/{MODEL}:generateContent");
        let response = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(prompt, schema))
            .send()
            .await?
            .error_for_status()?;
        let envelope: GenerateResponse = response.json().await?;
        parse_converted(&envelope)
    }
}

#[async_trait]
impl CalendarConverter for GeminiConverter {
    async fn today_hijri(&self) -> Result<ConvertedDate> {
        let today = format_date(&Local::now().date_naive());
        let prompt = format!(
            "التاريخ الميلادي اليوم هو {today}. \
             ما هو تاريخ اليوم بالتقويم الهجري حسب تقويم أم القرى؟ \
             أجب بصيغة JSON فقط."
        );
        self.generate(&prompt, &TODAY_SCHEMA).await
    }

    async fn to_hijri(&self, date: NaiveDate) -> Result<ConvertedDate> {
        let prompt = format!(
            "حوّل التاريخ الميلادي {} إلى التاريخ الهجري المقابل حسب تقويم أم القرى. \
             أجب بصيغة JSON فقط.",
            format_date(&date)
        );
        self.generate(&prompt, &DATE_SCHEMA).await
    }

    async fn to_gregorian(&self, year: i32, month: u32, day: u32) -> Result<ConvertedDate> {
        check_hijri(year, month, day)?;
        let prompt = format!(
            "حوّل التاريخ الهجري {day}/{month}/{year} حسب تقويم أم القرى \
             إلى التاريخ الميلادي المقابل. أجب بصيغة JSON فقط."
        );
        self.generate(&prompt, &DATE_SCHEMA).await
    }
}

/// Basic range check on a Hijri date before it reaches the service
fn check_hijri(year: i32, month: u32, day: u32) -> Result<()> {
    if year < 1 {
        return Err(TanbihError::invalid_input("hijri year must be positive"));
    }
    if !(1..=12).contains(&month) {
        return Err(TanbihError::invalid_input(
            "hijri month must be between 1 and 12",
        ));
    }
    if !(1..=30).contains(&day) {
        return Err(TanbihError::invalid_input(
            "hijri day must be between 1 and 30",
        ));
    }
    Ok(())
}

fn request_body(prompt: &str, schema: &Value) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": schema
        }
    })
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

/// Pull the schema-shaped date out of the response envelope.
///
/// # Errors
/// `Conversion` when the response is empty or does not match the schema.
fn parse_converted(envelope: &GenerateResponse) -> Result<ConvertedDate> {
    let text = envelope
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .and_then(|content| content.parts.first())
        .map(|part| part.text.trim())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| TanbihError::conversion("empty response from conversion service"))?;
    serde_json::from_str(text)
        .map_err(|err| TanbihError::conversion(format!("unusable conversion response: {err}")))
}
