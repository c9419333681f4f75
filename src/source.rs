//! # Heart Rate Server Client
//!
//! Reads the current heart rate and theme from the overlay server.
//!
//! ## Endpoints
//! - `GET /api/hr` → `{"hr": 72}`; `-1` while no device is connected
//! - `GET /api/theme` → `{"theme": "retro"}`; the value may also be a JSON
//!   override object encoded as a string

use crate::error::PollError;
use crate::history::HeartRateSample;
use serde::Deserialize;
use std::time::Duration;

// Per-request timeout, kept below the default poll interval
const REQUEST_TIMEOUT: Duration = Duration::from_millis(800);

#[derive(Debug, Deserialize)]
struct HeartRatePayload {
    hr: i64,
}

#[derive(Debug, Deserialize)]
struct ThemePayload {
    #[serde(default)]
    theme: Option<String>,
}

pub fn parse_heart_rate(body: &str) -> Result<HeartRateSample, PollError> {
    let payload: HeartRatePayload = serde_json::from_str(body).map_err(PollError::Decode)?;
    Ok(HeartRateSample::from_reading(payload.hr))
}

/// Theme string from the body, `None` when absent or blank
pub fn parse_theme(body: &str) -> Result<Option<String>, PollError> {
    let payload: ThemePayload = serde_json::from_str(body).map_err(PollError::Decode)?;
    Ok(payload.theme.filter(|theme| !theme.trim().is_empty()))
}

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSource {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get(&self, path: &str) -> Result<String, PollError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .map_err(PollError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollError::Status(status.as_u16()));
        }
        response.text().await.map_err(PollError::Request)
    }

    pub async fn poll_heart_rate(&self) -> Result<HeartRateSample, PollError> {
        let body = self.get("/api/hr").await?;
        parse_heart_rate(&body)
    }

    pub async fn poll_theme(&self) -> Result<Option<String>, PollError> {
        let body = self.get("/api/theme").await?;
        parse_theme(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_heart_rate() {
        assert_eq!(
            parse_heart_rate(r#"{"hr": 72}"#).unwrap(),
            HeartRateSample::new(72, true)
        );
        assert_eq!(
            parse_heart_rate(r#"{"hr": -1}"#).unwrap(),
            HeartRateSample::disconnected()
        );
    }

    #[test]
    fn test_parse_heart_rate_rejects_garbage() {
        assert!(matches!(parse_heart_rate("oops"), Err(PollError::Decode(_))));
        assert!(matches!(parse_heart_rate(r#"{"bpm": 60}"#), Err(PollError::Decode(_))));
    }

    #[test]
    fn test_parse_theme() {
        assert_eq!(parse_theme(r#"{"theme": "retro"}"#).unwrap(), Some("retro".to_string()));
        assert_eq!(parse_theme(r#"{"theme": "  "}"#).unwrap(), None);
        assert_eq!(parse_theme("{}").unwrap(), None);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let source = HttpSource::new("http://127.0.0.1:17878/");
        assert_eq!(source.base_url, "http://127.0.0.1:17878");
    }
}
