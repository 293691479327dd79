use crate::probes::{Measurement, ProbeError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome classification of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    Success,
    HttpError,
    Timeout,
    NetworkError,
    InvalidUrl,
    ParseError,
}

impl FetchStatus {
    pub fn from_status_code(code: u16) -> Self {
        if (200..300).contains(&code) {
            FetchStatus::Success
        } else {
            FetchStatus::HttpError
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchStatus::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStatus::Success => "success",
            FetchStatus::HttpError => "http_error",
            FetchStatus::Timeout => "timeout",
            FetchStatus::NetworkError => "network_error",
            FetchStatus::InvalidUrl => "invalid_url",
            FetchStatus::ParseError => "parse_error",
        }
    }
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column names, in [`PerformanceRecord`] field order.
pub const CSV_HEADER: [&str; 18] = [
    "url",
    "status",
    "response_time_ms",
    "timestamp",
    "status_code",
    "final_url",
    "content_length",
    "ttfb_ms",
    "resource_count",
    "fcp_ms",
    "lcp_ms",
    "speed_index_ms",
    "tbt_ms",
    "tti_ms",
    "page_size_kb",
    "js_execution_ms",
    "load_time_ms",
    "error",
];

/// One row of output. Field order here is the CSV column order and the JSON
/// key order; `None` becomes an empty CSV field and a JSON `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub url: String,
    pub status: FetchStatus,
    pub response_time_ms: Option<f64>,
    pub timestamp: DateTime<Utc>,
    pub status_code: Option<u16>,
    pub final_url: Option<String>,
    pub content_length: Option<u64>,
    pub ttfb_ms: Option<f64>,
    pub resource_count: Option<u64>,
    pub fcp_ms: Option<f64>,
    pub lcp_ms: Option<f64>,
    pub speed_index_ms: Option<f64>,
    pub tbt_ms: Option<f64>,
    pub tti_ms: Option<f64>,
    pub page_size_kb: Option<f64>,
    pub js_execution_ms: Option<f64>,
    pub load_time_ms: Option<f64>,
    pub error: Option<String>,
}

impl PerformanceRecord {
    fn empty(url: &str, status: FetchStatus, timestamp: DateTime<Utc>) -> Self {
        Self {
            url: url.to_string(),
            status,
            response_time_ms: None,
            timestamp,
            status_code: None,
            final_url: None,
            content_length: None,
            ttfb_ms: None,
            resource_count: None,
            fcp_ms: None,
            lcp_ms: None,
            speed_index_ms: None,
            tbt_ms: None,
            tti_ms: None,
            page_size_kb: None,
            js_execution_ms: None,
            load_time_ms: None,
            error: None,
        }
    }

    /// A response came back. Non-2xx codes are recorded as `http_error` but
    /// keep their timing data.
    pub fn from_measurement(url: &str, timestamp: DateTime<Utc>, m: Measurement) -> Self {
        let status = FetchStatus::from_status_code(m.status_code);
        let error = (!status.is_success()).then(|| format!("HTTP status {}", m.status_code));
        let metrics = m.metrics;

        Self {
            response_time_ms: Some(m.response_time_ms),
            status_code: Some(m.status_code),
            final_url: m.final_url,
            content_length: m.content_length,
            ttfb_ms: m.ttfb_ms,
            resource_count: metrics.resource_count,
            fcp_ms: metrics.fcp_ms,
            lcp_ms: metrics.lcp_ms,
            speed_index_ms: metrics.speed_index_ms,
            tbt_ms: metrics.tbt_ms,
            tti_ms: metrics.tti_ms,
            page_size_kb: metrics.page_size_kb,
            js_execution_ms: metrics.js_execution_ms,
            load_time_ms: metrics.load_time_ms,
            error,
            ..Self::empty(url, status, timestamp)
        }
    }

    pub fn from_probe_error(url: &str, timestamp: DateTime<Utc>, err: &ProbeError) -> Self {
        let status = match err {
            ProbeError::Timeout(_) => FetchStatus::Timeout,
            ProbeError::Network(_) => FetchStatus::NetworkError,
            ProbeError::Decode { .. } => FetchStatus::ParseError,
        };
        let status_code = match err {
            ProbeError::Decode { status_code, .. } => Some(*status_code),
            _ => None,
        };

        Self {
            status_code,
            error: Some(err.to_string()),
            ..Self::empty(url, status, timestamp)
        }
    }

    pub fn invalid_url(url: &str, timestamp: DateTime<Utc>, reason: impl fmt::Display) -> Self {
        Self {
            error: Some(format!("invalid URL: {}", reason)),
            ..Self::empty(url, FetchStatus::InvalidUrl, timestamp)
        }
    }
}
