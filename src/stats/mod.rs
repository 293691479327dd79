use crate::record::{FetchStatus, PerformanceRecord};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_urls: usize,
    pub successful: usize,
    pub failed: usize,
    pub bytes_downloaded: u64,
    pub outcomes: HashMap<FetchStatus, usize>,
    pub status_codes: BTreeMap<u16, usize>,
    /// Mean over records that carry a response time, in milliseconds.
    pub average_response_time: f64,
    timed_requests: usize,
}

impl RunStats {
    pub fn count(&self, status: FetchStatus) -> usize {
        self.outcomes.get(&status).copied().unwrap_or(0)
    }

    fn fresh() -> Self {
        Self {
            start_time: Utc::now(),
            end_time: None,
            total_urls: 0,
            successful: 0,
            failed: 0,
            bytes_downloaded: 0,
            outcomes: HashMap::new(),
            status_codes: BTreeMap::new(),
            average_response_time: 0.0,
            timed_requests: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatsTracker {
    stats: Arc<RwLock<RunStats>>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(RwLock::new(RunStats::fresh())),
        }
    }

    /// Drops everything recorded so far and restarts the clock.
    pub fn reset(&self) {
        *self.stats.write() = RunStats::fresh();
    }

    pub fn record(&self, record: &PerformanceRecord) {
        let mut stats = self.stats.write();
        stats.total_urls += 1;

        if record.status.is_success() {
            stats.successful += 1;
        } else {
            stats.failed += 1;
        }
        *stats.outcomes.entry(record.status).or_insert(0) += 1;

        if let Some(code) = record.status_code {
            *stats.status_codes.entry(code).or_insert(0) += 1;
        }
        stats.bytes_downloaded += record.content_length.unwrap_or(0);

        if let Some(elapsed) = record.response_time_ms {
            stats.timed_requests += 1;
            let current_total = stats.average_response_time * (stats.timed_requests - 1) as f64;
            stats.average_response_time = (current_total + elapsed) / stats.timed_requests as f64;
        }
    }

    pub fn finish(&self) {
        self.stats.write().end_time = Some(Utc::now());
    }

    pub fn get_stats(&self) -> RunStats {
        self.stats.read().clone()
    }

    pub fn print_summary(&self) {
        let stats = self.stats.read();
        let duration = stats
            .end_time
            .unwrap_or_else(Utc::now)
            .signed_duration_since(stats.start_time);

        println!("\nCollection Statistics:");
        println!("======================");
        println!("Duration: {} seconds", duration.num_seconds());
        println!("URLs Processed: {}", stats.total_urls);
        println!("Successful: {}", stats.successful);
        println!("Failed: {}", stats.failed);
        println!(
            "Data Downloaded: {:.2} MB",
            stats.bytes_downloaded as f64 / 1_000_000.0
        );
        println!(
            "Average Response Time: {:.2}ms",
            stats.average_response_time
        );

        if !stats.status_codes.is_empty() {
            println!("\nStatus Codes:");
            for (code, count) in &stats.status_codes {
                println!("  {}: {}", code, count);
            }
        }

        if stats.failed > 0 {
            println!("\nFailures:");
            for (status, count) in &stats.outcomes {
                if !status.is_success() {
                    println!("  {}: {}", status, count);
                }
            }
        }
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probes::{Measurement, ProbeError};

    #[test]
    fn test_counts_and_average() {
        let tracker = StatsTracker::new();
        let now = Utc::now();

        let mut ok = Measurement::new(200, 100.0);
        ok.content_length = Some(2_000);
        tracker.record(&PerformanceRecord::from_measurement("https://a.example", now, ok));
        tracker.record(&PerformanceRecord::from_measurement(
            "https://b.example",
            now,
            Measurement::new(500, 300.0),
        ));
        tracker.record(&PerformanceRecord::from_probe_error(
            "https://c.example",
            now,
            &ProbeError::Network("refused".to_string()),
        ));
        tracker.finish();

        let stats = tracker.get_stats();
        assert_eq!(stats.total_urls, 3);
        assert_eq!(stats.successful, 1);
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.count(FetchStatus::HttpError), 1);
        assert_eq!(stats.count(FetchStatus::NetworkError), 1);
        assert_eq!(stats.count(FetchStatus::Timeout), 0);
        assert_eq!(stats.status_codes.get(&500), Some(&1));
        assert_eq!(stats.bytes_downloaded, 2_000);
        // untimed failures stay out of the mean
        assert_eq!(stats.average_response_time, 200.0);
        assert!(stats.end_time.is_some());
    }

    #[test]
    fn test_reset_starts_over() {
        let tracker = StatsTracker::new();
        let before = tracker.get_stats().start_time;
        tracker.record(&PerformanceRecord::from_measurement(
            "https://a.example",
            Utc::now(),
            Measurement::new(200, 50.0),
        ));
        tracker.finish();

        tracker.reset();

        let stats = tracker.get_stats();
        assert_eq!(stats.total_urls, 0);
        assert_eq!(stats.successful, 0);
        assert!(stats.status_codes.is_empty());
        assert_eq!(stats.average_response_time, 0.0);
        assert!(stats.end_time.is_none());
        assert!(stats.start_time >= before);
    }
}
