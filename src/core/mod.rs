mod collecting;
mod config;
mod errors;

pub use collecting::{run, Collector, RunResult};
pub use config::{
    CollectorConfig, ProbeBackend, Strategy, DEFAULT_MAX_REDIRECTS, DEFAULT_PAGESPEED_TIMEOUT,
    DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, PAGESPEED_API_URL,
};
pub use errors::{CollectorError, CollectorResult};
