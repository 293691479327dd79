pub mod http_probe;
pub mod mock_probe;
pub mod pagespeed;

mod probe;
pub use http_probe::HttpProbe;
pub use mock_probe::{MockOutcome, MockProbe};
pub use pagespeed::PageSpeedProbe;
pub use probe::{Measurement, PageMetrics, Probe, ProbeError, ProbeResult};
