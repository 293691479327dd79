use async_trait::async_trait;
use std::error::Error as StdError;
use std::time::{Duration, Instant};
use thiserror::Error;
use url::Url;

/// Page-level metrics a backend may report on top of raw timing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetrics {
    pub resource_count: Option<u64>,
    pub fcp_ms: Option<f64>,
    pub lcp_ms: Option<f64>,
    pub speed_index_ms: Option<f64>,
    pub tbt_ms: Option<f64>,
    pub tti_ms: Option<f64>,
    pub page_size_kb: Option<f64>,
    pub js_execution_ms: Option<f64>,
    pub load_time_ms: Option<f64>,
}

/// What a probe observed when a response came back, whatever its status.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub status_code: u16,
    pub response_time_ms: f64,
    pub ttfb_ms: Option<f64>,
    pub final_url: Option<String>,
    pub content_length: Option<u64>,
    pub metrics: PageMetrics,
}

impl Measurement {
    pub fn new(status_code: u16, response_time_ms: f64) -> Self {
        Self {
            status_code,
            response_time_ms,
            ttfb_ms: None,
            final_url: None,
            content_length: None,
            metrics: PageMetrics::default(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProbeError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to decode response (HTTP {status_code}): {message}")]
    Decode { status_code: u16, message: String },
}

impl ProbeError {
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            return ProbeError::Timeout(timeout);
        }

        // reqwest's top-level message hides the cause (DNS, refused, TLS...)
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        ProbeError::Network(message)
    }
}

pub type ProbeResult<T> = Result<T, ProbeError>;

#[async_trait]
pub trait Probe: Send + Sync {
    fn name(&self) -> &'static str;

    /// Performs exactly one measurement attempt of `url`.
    async fn probe(&self, url: &Url) -> ProbeResult<Measurement>;
}

pub(crate) fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
