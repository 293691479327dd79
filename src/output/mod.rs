pub mod csv_sink;
pub mod json_sink;
pub mod sink;

pub use csv_sink::CsvSink;
pub use json_sink::JsonSink;
pub use sink::RecordSink;

use crate::core::CollectorResult;
use crate::PerformanceRecord;
use log::info;
use sink::{check_target, stage};
use std::path::Path;

/// Writes the same records to both the CSV and the JSON file. Either both
/// files are replaced or neither is.
pub fn write_outputs(
    records: &[PerformanceRecord],
    csv_path: impl AsRef<Path>,
    json_path: impl AsRef<Path>,
) -> CollectorResult<()> {
    let sinks: [Box<dyn RecordSink>; 2] = [
        Box::new(CsvSink::new(csv_path)),
        Box::new(JsonSink::new(json_path)),
    ];

    let mut rendered = Vec::with_capacity(sinks.len());
    for sink in &sinks {
        rendered.push(sink.render(records)?);
        check_target(sink.path())?;
    }

    let mut staged = Vec::with_capacity(sinks.len());
    for (sink, bytes) in sinks.iter().zip(&rendered) {
        match stage(sink.path(), bytes) {
            Ok(file) => staged.push(file),
            Err(err) => {
                staged.into_iter().for_each(|file| file.discard());
                return Err(err);
            }
        }
    }

    for (sink, file) in sinks.iter().zip(staged) {
        file.commit()?;
        info!(
            "Saved {} records to {} ({})",
            records.len(),
            sink.path().display(),
            sink.name()
        );
    }
    Ok(())
}
