use super::sink::RecordSink;
use crate::core::{CollectorError, CollectorResult};
use crate::record::CSV_HEADER;
use crate::PerformanceRecord;
use log::debug;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl RecordSink for CsvSink {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn render(&self, records: &[PerformanceRecord]) -> CollectorResult<Vec<u8>> {
        // Header is written by hand so that an empty run still gets one.
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        writer.write_record(CSV_HEADER)?;
        for record in records {
            writer.serialize(record)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| CollectorError::OutputWrite {
                path: self.path.clone(),
                source: e.into_error(),
            })?;

        debug!("Rendered {} CSV rows for {}", records.len(), self.path.display());
        Ok(bytes)
    }
}
