use crate::core::{CollectorConfig, CollectorResult, ProbeBackend};
use crate::input::{load_urls, UrlEntry};
use crate::output::write_outputs;
use crate::probes::{HttpProbe, PageSpeedProbe, Probe};
use crate::record::{FetchStatus, PerformanceRecord};
use crate::stats::{RunStats, StatsTracker};
use chrono::Utc;
use log::{debug, info, warn};
use std::path::Path;
use url::Url;

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub records: Vec<PerformanceRecord>,
    pub stats: RunStats,
}

impl RunResult {
    pub fn failures(&self) -> usize {
        self.records.iter().filter(|r| !r.status.is_success()).count()
    }
}

/// Probes URL entries one at a time and keeps one record per entry.
pub struct Collector {
    probe: Box<dyn Probe>,
    stats: StatsTracker,
}

impl Collector {
    pub fn new(probe: Box<dyn Probe>) -> Self {
        info!("Initializing collector with {} probe", probe.name());
        Self {
            probe,
            stats: StatsTracker::new(),
        }
    }

    pub fn from_config(config: &CollectorConfig) -> CollectorResult<Self> {
        let probe: Box<dyn Probe> = match config.backend {
            ProbeBackend::Direct => Box::new(HttpProbe::from_config(config)?),
            ProbeBackend::PageSpeed { .. } => Box::new(PageSpeedProbe::from_config(config)?),
        };
        Ok(Self::new(probe))
    }

    pub fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    /// Loads the list, probes every entry, then writes both outputs. Nothing
    /// is written if the list cannot be read. Statistics cover this run only.
    pub async fn run(
        &self,
        url_list_path: impl AsRef<Path>,
        csv_output_path: impl AsRef<Path>,
        json_output_path: impl AsRef<Path>,
    ) -> CollectorResult<RunResult> {
        let entries = load_urls(url_list_path.as_ref())?;
        self.stats.reset();
        info!(
            "Loaded {} URLs from {}",
            entries.len(),
            url_list_path.as_ref().display()
        );

        let records = self.collect(&entries).await;
        write_outputs(&records, csv_output_path, json_output_path)?;

        self.stats.finish();
        Ok(RunResult {
            records,
            stats: self.stats.get_stats(),
        })
    }

    /// One record per entry, in entry order. Failures are recorded, never
    /// dropped.
    pub async fn collect(&self, entries: &[UrlEntry]) -> Vec<PerformanceRecord> {
        let total = entries.len();
        let mut records = Vec::with_capacity(total);

        for (i, entry) in entries.iter().enumerate() {
            info!("[{}/{}] Measuring {}", i + 1, total, entry.raw);
            let record = self.measure(entry).await;

            match record.status {
                FetchStatus::Success => debug!(
                    "{} -> {} in {:.1}ms",
                    entry.raw,
                    record.status_code.unwrap_or_default(),
                    record.response_time_ms.unwrap_or_default()
                ),
                _ => warn!(
                    "{} (line {}) -> {}: {}",
                    entry.raw,
                    entry.line,
                    record.status,
                    record.error.as_deref().unwrap_or("unknown error")
                ),
            }

            self.stats.record(&record);
            records.push(record);
        }

        records
    }

    async fn measure(&self, entry: &UrlEntry) -> PerformanceRecord {
        let timestamp = Utc::now();

        let url = match parse_target(&entry.raw) {
            Ok(url) => url,
            Err(reason) => return PerformanceRecord::invalid_url(&entry.raw, timestamp, reason),
        };

        match self.probe.probe(&url).await {
            Ok(measurement) => {
                PerformanceRecord::from_measurement(&entry.raw, timestamp, measurement)
            }
            Err(err) => PerformanceRecord::from_probe_error(&entry.raw, timestamp, &err),
        }
    }
}

/// Only absolute http(s) URLs are probed.
fn parse_target(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        "http" | "https" => Err("missing host".to_string()),
        scheme => Err(format!("unsupported scheme {:?}", scheme)),
    }
}

/// Runs a default-configured collector over `url_list_path`.
pub async fn run(
    url_list_path: impl AsRef<Path>,
    csv_output_path: impl AsRef<Path>,
    json_output_path: impl AsRef<Path>,
) -> CollectorResult<RunResult> {
    let collector = Collector::from_config(&CollectorConfig::default())?;
    collector
        .run(url_list_path, csv_output_path, json_output_path)
        .await
}
