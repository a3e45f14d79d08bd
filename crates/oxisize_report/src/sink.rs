use log::{debug, info};
use std::{
    fs,
    path::{Path, PathBuf},
};

use oxisize_core::{Result, SizeError};

/// Destination for a finished report.
pub trait ReportSink {
    fn deliver(&self, artifact: &str, report: &str) -> Result<()>;
}

/// Writes each report as `<dir>/<artifact>`, creating `dir` on demand.
#[derive(Debug, Clone)]
pub struct DirectoryWriter {
    dir: PathBuf,
}

impl DirectoryWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ReportSink for DirectoryWriter {
    fn deliver(&self, artifact: &str, report: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| SizeError::io(&self.dir, e))?;
        write_report(&self.dir.join(artifact), report)
    }
}

/// Writes the report to one fixed file, whatever the artifact name.
#[derive(Debug, Clone)]
pub struct FileWriter {
    path: PathBuf,
}

impl FileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for FileWriter {
    fn deliver(&self, _artifact: &str, report: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SizeError::io(parent, e))?;
        }
        write_report(&self.path, report)
    }
}

/// CI upload hook. Uploading is not wired to any service yet, so this only
/// logs what would have been sent.
#[derive(Debug, Clone, Copy, Default)]
pub struct CiUploadStub;

impl ReportSink for CiUploadStub {
    fn deliver(&self, artifact: &str, report: &str) -> Result<()> {
        info!("CI upload is not configured; skipping {} ({} bytes)", artifact, report.len());
        Ok(())
    }
}

fn write_report(path: &Path, report: &str) -> Result<()> {
    debug!("Writing report to {}", path.display());
    fs::write(path, report).map_err(|e| SizeError::io(path, e))
}
