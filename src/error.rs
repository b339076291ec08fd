use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the transfer pipeline.
///
/// Source-level errors (`UnsupportedFormat` on the source, `NoSourceGps`,
/// an unreadable source) abort a batch before any target is touched.
/// Target-level errors are caught per target and recorded in the summary.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The file extension is not one of jpg/jpeg/png/tif/tiff/heic/heif.
    #[error("unsupported image format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// The source image carries no GPS block to transfer.
    #[error("source image has no GPS data")]
    NoSourceGps,

    /// The file has no parseable EXIF block. Targets treat this as an
    /// empty base rather than a failure.
    #[error("no EXIF metadata found in {}", .0.display())]
    NoMetadata(PathBuf),

    /// The container is corrupt or could not be decoded.
    #[error("failed to decode {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    /// Serializing or persisting the merged metadata failed. The original
    /// file is left untouched.
    #[error("failed to write {}: {reason}", .path.display())]
    Write { path: PathBuf, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransferError {
    pub(crate) fn decode(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Self::Decode {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }

    pub(crate) fn write(path: &std::path::Path, reason: impl Into<String>) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
