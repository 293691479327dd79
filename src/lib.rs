pub mod core;
pub mod input;
pub mod output;
pub mod parser;
pub mod probes;
pub mod record;
pub mod stats;

pub use crate::core::{run, Collector, CollectorConfig, CollectorError, CollectorResult, RunResult};
pub use input::{load_urls, UrlEntry};
pub use output::{write_outputs, CsvSink, JsonSink, RecordSink};
pub use probes::{HttpProbe, PageSpeedProbe, Probe};
pub use record::{FetchStatus, PerformanceRecord};
pub use stats::StatsTracker;
