//! Error types for discovery, metadata, encoding and per-file processing.
//!
//! Only [`DiscoveryError`] aborts a run. Everything else is attached to the
//! file it happened on and the run moves on.

use std::path::PathBuf;
use std::process::ExitStatus;

/// The input tree could not be enumerated.
#[derive(Debug, thiserror::Error)]
#[error("cannot list {}: {source}", path.display())]
pub struct DiscoveryError {
    pub path: PathBuf,
    #[source]
    pub source: walkdir::Error,
}

/// Failures talking to the metadata tool.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("failed to start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: ::exiftool::ExifToolError,
    },

    #[error("metadata tool failed: {0}")]
    Tool(#[from] ::exiftool::ExifToolError),

    #[error("metadata tool I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("path cannot be passed to the metadata tool: {}", .0.display())]
    UnsupportedPath(PathBuf),

    #[error("no metadata returned for {}", .0.display())]
    NoRecord(PathBuf),

    #[error("unreadable metadata output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("metadata write rejected: {0}")]
    WriteRejected(String),
}

/// Failures of an external encoder invocation.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("failed to start {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} exited with {status}: {stderr}", program.display())]
    Failed {
        program: PathBuf,
        status: ExitStatus,
        stderr: String,
    },

    #[error("destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Why a single file could not be migrated.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("could not read metadata: {0}")]
    MetadataRead(#[source] MetadataError),

    #[error("metadata has no MIME type")]
    MissingMimeType,

    #[error("file already exists: {}", .0.display())]
    Exists(PathBuf),

    #[error("conversion failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("{} is not inside the input directory", .0.display())]
    OutsideInput(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Restoring capture dates on a destination failed. Logged, never fatal.
#[derive(Debug, thiserror::Error)]
pub enum DateStampError {
    #[error("writing metadata dates: {0}")]
    Write(#[from] MetadataError),

    #[error("setting file times: {0}")]
    FileTimes(#[source] std::io::Error),

    #[error("removing backup {}: {source}", path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exists_error_names_the_path() {
        let err = FileError::Exists(PathBuf::from("/out/a/b.heic"));
        assert_eq!(err.to_string(), "file already exists: /out/a/b.heic");
    }

    #[test]
    fn metadata_read_wraps_the_tool_error() {
        let err = FileError::MetadataRead(MetadataError::NoRecord(PathBuf::from("x.jpg")));
        assert_eq!(
            err.to_string(),
            "could not read metadata: no metadata returned for x.jpg"
        );
    }
}
