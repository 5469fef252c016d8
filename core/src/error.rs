use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to load a `package.json`
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse JSON in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ManifestError {
    pub fn path(&self) -> &Path {
        match self {
            ManifestError::Read { path, .. } | ManifestError::Parse { path, .. } => path.as_path(),
        }
    }
}

/// Failure to persist or reload an aggregate report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to serialize dependency report: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Failed to write dependency report to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to read dependency report {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse dependency report {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
