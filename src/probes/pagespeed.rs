use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use url::Url;

use super::http_probe::build_client;
use super::probe::{elapsed_ms, Measurement, PageMetrics, Probe, ProbeError, ProbeResult};
use crate::core::{CollectorConfig, CollectorError, CollectorResult, ProbeBackend, Strategy};

/// Delegates the measurement to the PageSpeed Insights API and reads the
/// Lighthouse audits out of its report.
#[derive(Clone)]
pub struct PageSpeedProbe {
    client: Client,
    api_url: Url,
    api_key: Option<String>,
    strategy: Strategy,
    timeout: Duration,
}

impl PageSpeedProbe {
    pub fn from_config(config: &CollectorConfig) -> CollectorResult<Self> {
        let ProbeBackend::PageSpeed {
            api_url,
            api_key,
            strategy,
        } = &config.backend
        else {
            return Err(CollectorError::Config(
                "PageSpeed probe requires the pagespeed backend".to_string(),
            ));
        };

        let api_url = Url::parse(api_url).map_err(|e| {
            CollectorError::Config(format!("invalid PageSpeed API URL {}: {}", api_url, e))
        })?;
        if api_key.is_none() {
            warn!("No PageSpeed API key configured; requests are subject to anonymous quota");
        }

        let timeout = config.effective_timeout();
        Ok(Self {
            client: build_client(config, timeout)?,
            api_url,
            api_key: api_key.clone(),
            strategy: *strategy,
            timeout,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageSpeedReport {
    lighthouse_result: Option<LighthouseResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LighthouseResult {
    final_url: Option<String>,
    #[serde(default)]
    audits: HashMap<String, Audit>,
    timing: Option<Timing>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Audit {
    numeric_value: Option<f64>,
    details: Option<AuditDetails>,
}

#[derive(Debug, Deserialize)]
struct AuditDetails {
    items: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct Timing {
    total: Option<f64>,
}

impl LighthouseResult {
    fn numeric(&self, audit: &str) -> Option<f64> {
        self.audits.get(audit).and_then(|a| a.numeric_value)
    }

    fn item_count(&self, audit: &str) -> Option<u64> {
        self.audits.get(audit).map(|a| {
            a.details
                .as_ref()
                .and_then(|d| d.items.as_ref())
                .map_or(0, |items| items.len() as u64)
        })
    }

    fn page_metrics(&self) -> PageMetrics {
        PageMetrics {
            resource_count: self.item_count("network-requests"),
            fcp_ms: self.numeric("first-contentful-paint"),
            lcp_ms: self.numeric("largest-contentful-paint"),
            speed_index_ms: self.numeric("speed-index"),
            tbt_ms: self.numeric("total-blocking-time"),
            tti_ms: self.numeric("interactive"),
            page_size_kb: self.numeric("total-byte-weight").map(|bytes| bytes / 1024.0),
            js_execution_ms: self.numeric("bootup-time"),
            load_time_ms: self.timing.as_ref().and_then(|t| t.total),
        }
    }
}

#[async_trait]
impl Probe for PageSpeedProbe {
    fn name(&self) -> &'static str {
        "pagespeed"
    }

    async fn probe(&self, url: &Url) -> ProbeResult<Measurement> {
        let mut request = self.client.get(self.api_url.clone()).query(&[
            ("url", url.as_str()),
            ("strategy", self.strategy.as_str()),
            ("category", "performance"),
        ]);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        let start = Instant::now();
        let response = request
            .send()
            .await
            .map_err(|e| ProbeError::from_reqwest(e, self.timeout))?;
        let status_code = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ProbeError::from_reqwest(e, self.timeout))?;
        let response_time_ms = elapsed_ms(start);

        if !(200..300).contains(&status_code) {
            debug!("PageSpeed API answered {} for {}", status_code, url);
            return Ok(Measurement::new(status_code, response_time_ms));
        }

        let report: PageSpeedReport =
            serde_json::from_str(&body).map_err(|e| ProbeError::Decode {
                status_code,
                message: e.to_string(),
            })?;
        let lighthouse = report.lighthouse_result.ok_or_else(|| ProbeError::Decode {
            status_code,
            message: "report has no lighthouseResult".to_string(),
        })?;

        debug!(
            "Lighthouse report for {} ({} audits) in {:.1}ms",
            url,
            lighthouse.audits.len(),
            response_time_ms
        );

        Ok(Measurement {
            status_code,
            response_time_ms,
            ttfb_ms: lighthouse.numeric("server-response-time"),
            final_url: lighthouse.final_url.clone(),
            content_length: None,
            metrics: lighthouse.page_metrics(),
        })
    }
}
