use crate::core::{CollectorError, CollectorResult};
use crate::PerformanceRecord;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A destination for the full, ordered result set of a run.
pub trait RecordSink {
    fn name(&self) -> &'static str;

    fn path(&self) -> &Path;

    /// Encodes `records` without touching the destination.
    fn render(&self, records: &[PerformanceRecord]) -> CollectorResult<Vec<u8>>;

    /// Replaces whatever the destination held with `records`.
    fn write(&self, records: &[PerformanceRecord]) -> CollectorResult<()> {
        let bytes = self.render(records)?;
        check_target(self.path())?;
        stage(self.path(), &bytes)?.commit()
    }
}

fn write_error(path: &Path, source: io::Error) -> CollectorError {
    CollectorError::OutputWrite {
        path: path.to_path_buf(),
        source,
    }
}

/// Fails early when `path` can never be replaced by a regular file.
pub(crate) fn check_target(path: &Path) -> CollectorResult<()> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Err(write_error(
            path,
            io::Error::other("output path is a directory"),
        )),
        _ => Ok(()),
    }
}

/// Content written next to its target, not yet visible under the target name.
#[derive(Debug)]
pub(crate) struct StagedFile {
    tmp: PathBuf,
    target: PathBuf,
}

pub(crate) fn stage(target: &Path, bytes: &[u8]) -> CollectorResult<StagedFile> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| write_error(target, e))?;
    }

    let mut name = OsString::from(".");
    name.push(target.file_name().unwrap_or_default());
    name.push(".tmp");
    let tmp = target.with_file_name(name);

    fs::write(&tmp, bytes).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        write_error(target, e)
    })?;

    Ok(StagedFile {
        tmp,
        target: target.to_path_buf(),
    })
}

impl StagedFile {
    pub(crate) fn commit(self) -> CollectorResult<()> {
        fs::rename(&self.tmp, &self.target).map_err(|e| {
            let _ = fs::remove_file(&self.tmp);
            write_error(&self.target, e)
        })
    }

    pub(crate) fn discard(self) {
        let _ = fs::remove_file(&self.tmp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_is_invisible_until_commit() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.csv");
        fs::write(&target, "old").unwrap();

        let staged = stage(&target, b"new").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "old");

        staged.commit().unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_discard_leaves_target_alone() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.json");

        stage(&target, b"[]").unwrap().discard();

        assert!(!target.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_directory_target_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            check_target(dir.path()),
            Err(CollectorError::OutputWrite { .. })
        ));
        assert!(check_target(&dir.path().join("missing.csv")).is_ok());
    }
}
