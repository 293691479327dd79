use super::sink::RecordSink;
use crate::core::CollectorResult;
use crate::PerformanceRecord;
use log::debug;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct JsonSink {
    path: PathBuf,
}

impl JsonSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl RecordSink for JsonSink {
    fn name(&self) -> &'static str {
        "json"
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn render(&self, records: &[PerformanceRecord]) -> CollectorResult<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(records)?;
        bytes.push(b'\n');

        debug!("Rendered {} JSON objects for {}", records.len(), self.path.display());
        Ok(bytes)
    }
}
