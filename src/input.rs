use crate::core::{CollectorError, CollectorResult};
use log::debug;
use std::fs;
use std::path::Path;

/// One candidate URL from the input list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEntry {
    /// 1-based line number in the source file.
    pub line: usize,
    pub raw: String,
}

/// Reads the URL list at `path`. A missing or unreadable file is fatal.
pub fn load_urls<P: AsRef<Path>>(path: P) -> CollectorResult<Vec<UrlEntry>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| CollectorError::InputRead {
        path: path.to_path_buf(),
        source,
    })?;

    let entries = parse_url_list(&content);
    debug!("Loaded {} URL entries from {}", entries.len(), path.display());
    Ok(entries)
}

/// Trims every line and drops blanks and `#` comments. Everything else is
/// kept in order, malformed URLs included. A leading byte order mark is
/// ignored.
pub fn parse_url_list(content: &str) -> Vec<UrlEntry> {
    content
        .strip_prefix('\u{feff}')
        .unwrap_or(content)
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return None;
            }
            Some(UrlEntry {
                line: idx + 1,
                raw: trimmed.to_string(),
            })
        })
        .collect()
}
