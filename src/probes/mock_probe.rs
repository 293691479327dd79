use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use url::Url;

use super::probe::{Measurement, Probe, ProbeError, ProbeResult};

#[derive(Debug, Clone)]
pub enum MockOutcome {
    Response {
        status: u16,
        response_time_ms: f64,
    },
    Error(ProbeError),
}

/// Scripted probe keyed by URL. Unknown URLs get the default outcome.
#[derive(Clone)]
pub struct MockProbe {
    outcomes: Arc<HashMap<String, MockOutcome>>,
    default: MockOutcome,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl Default for MockProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProbe {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(HashMap::new()),
            default: MockOutcome::Response {
                status: 200,
                response_time_ms: 10.0,
            },
            delay: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_outcome(mut self, url: &str, outcome: MockOutcome) -> Self {
        Arc::make_mut(&mut self.outcomes).insert(url.to_string(), outcome);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// URLs probed so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Probe for MockProbe {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn probe(&self, url: &Url) -> ProbeResult<Measurement> {
        self.calls.lock().push(url.to_string());

        if let Some(delay) = self.delay {
            sleep(delay).await;
        }

        match self.outcomes.get(url.as_str()).unwrap_or(&self.default) {
            MockOutcome::Response {
                status,
                response_time_ms,
            } => Ok(Measurement::new(*status, *response_time_ms)),
            MockOutcome::Error(err) => Err(err.clone()),
        }
    }
}
