use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::TransferError;
use crate::exif::{Merged, MetadataBlock, merge, read_gps_decimal, read_metadata, write_metadata};
use crate::format::ContainerKind;

/// Per-batch transfer policy.
///
/// # Example
///
/// ```rust
/// use exif_transfer::transfer::TransferOptions;
///
/// let options = TransferOptions {
///     copy_date: true,
///     overwrite_existing_gps: false, // skip targets that already have GPS
///     backup_originals: false,
/// };
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferOptions {
    /// Copy DateTimeOriginal, DateTimeDigitized, and DateTime verbatim
    /// from the source.
    pub copy_date: bool,
    /// Replace a target's existing GPS block instead of skipping it.
    pub overwrite_existing_gps: bool,
    /// Create a `.bak` copy of each target before its first modification.
    pub backup_originals: bool,
}

/// Terminal state of a single target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Skipped,
    Failed,
}

/// The result recorded for one target file.
#[derive(Debug, Clone)]
pub struct TransferResult {
    pub path: PathBuf,
    pub outcome: Outcome,
    pub error: Option<String>,
}

/// Aggregated outcome of a whole batch.
#[derive(Debug)]
pub struct BatchSummary {
    pub success_count: usize,
    pub skipped_count: usize,
    /// Failed targets, in processing order.
    pub failed: Vec<TransferResult>,
    /// Human-readable one-line summary.
    pub message: String,
}

/// Copy the source's GPS block (and optionally dates) into every target.
///
/// Targets are processed strictly in order, each to completion before the
/// next. A target failure is recorded in the summary and never aborts the
/// batch; only source-level problems (unsupported format, unreadable file,
/// no GPS block) return an error, and they do so before any target is
/// touched.
///
/// The progress callback, if given, fires after each target with
/// `(completed, total, path)` and once more with an empty path when the
/// batch is done.
///
/// # Example
///
/// ```rust,no_run
/// use exif_transfer::transfer::{transfer, TransferOptions};
/// use std::path::{Path, PathBuf};
///
/// fn main() -> anyhow::Result<()> {
///     let targets = vec![PathBuf::from("a.jpg"), PathBuf::from("b.heic")];
///     let mut on_progress = |done: usize, total: usize, path: &str| {
///         println!("[{done}/{total}] {path}");
///     };
///
///     let summary = transfer(
///         Path::new("source.jpg"),
///         &targets,
///         &TransferOptions::default(),
///         Some(&mut on_progress),
///     )?;
///     println!("{}", summary.message);
///     Ok(())
/// }
/// ```
pub fn transfer(
    source: &Path,
    targets: &[PathBuf],
    options: &TransferOptions,
    mut progress: Option<&mut dyn FnMut(usize, usize, &str)>,
) -> Result<BatchSummary, TransferError> {
    let source_kind = ContainerKind::from_path(source)?;
    let source_block = match read_metadata(source, source_kind) {
        Ok(block) => block,
        // A source without any EXIF has no GPS to give
        Err(TransferError::NoMetadata(_)) => return Err(TransferError::NoSourceGps),
        Err(e) => return Err(e),
    };

    if !source_block.has_gps() {
        return Err(TransferError::NoSourceGps);
    }

    if let Ok(Some((lat, lon))) = read_gps_decimal(source) {
        log::info!("Source GPS: {lat:.6}, {lon:.6}");
    }

    let total = targets.len();
    let mut success_count = 0;
    let mut skipped_count = 0;
    let mut failed = Vec::new();

    for (i, target) in targets.iter().enumerate() {
        match process_target(&source_block, target, options) {
            Ok(TargetOutcome::Written) => {
                success_count += 1;
                log::info!("[{}/{}] Wrote GPS: {}", i + 1, total, target.display());
            }
            Ok(TargetOutcome::Skipped) => {
                skipped_count += 1;
                log::info!(
                    "[{}/{}] Skipped (existing GPS): {}",
                    i + 1,
                    total,
                    target.display()
                );
            }
            Err(e) => {
                log::warn!("[{}/{}] Failed: {}: {e}", i + 1, total, target.display());
                failed.push(TransferResult {
                    path: target.clone(),
                    outcome: Outcome::Failed,
                    error: Some(e.to_string()),
                });
            }
        }

        if let Some(cb) = progress.as_deref_mut() {
            cb(i + 1, total, &target.to_string_lossy());
        }
    }

    if let Some(cb) = progress.as_deref_mut() {
        cb(total, total, "");
    }

    let message = build_message(success_count, skipped_count, failed.len(), total);
    Ok(BatchSummary {
        success_count,
        skipped_count,
        failed,
        message,
    })
}

/// Non-failure terminal states of a single target. Failures travel as
/// errors so the orchestrator can record the message.
enum TargetOutcome {
    Written,
    Skipped,
}

fn process_target(
    source: &MetadataBlock,
    target: &Path,
    options: &TransferOptions,
) -> Result<TargetOutcome, TransferError> {
    let kind = ContainerKind::from_path(target)?;

    let existing = match read_metadata(target, kind) {
        Ok(block) => block,
        // No parseable EXIF is a valid empty base for a target
        Err(TransferError::NoMetadata(_)) => MetadataBlock::default(),
        Err(e) => return Err(e),
    };

    match merge(source, &existing, options)? {
        Merged::Skipped => Ok(TargetOutcome::Skipped),
        Merged::Write(metadata) => {
            if options.backup_originals {
                if let Err(e) = backup_file(target) {
                    log::warn!("Failed to backup {}: {e}", target.display());
                }
            }
            write_metadata(target, &metadata, kind)?;
            Ok(TargetOutcome::Written)
        }
    }
}

/// Create a `.bak` copy of the original file, once.
fn backup_file(path: &Path) -> std::io::Result<PathBuf> {
    let backup_path = path.with_extension(format!(
        "{}.bak",
        path.extension().unwrap_or_default().to_string_lossy()
    ));

    if !backup_path.exists() {
        std::fs::copy(path, &backup_path)?;
        log::debug!("Backup created: {}", backup_path.display());
    }

    Ok(backup_path)
}

fn build_message(success: usize, skipped: usize, failed: usize, total: usize) -> String {
    if total == 0 {
        return "No target files to process".to_string();
    }
    if failed == 0 {
        if skipped > 0 {
            return format!("Processed {success} file(s), skipped {skipped} with existing GPS data");
        }
        return format!("Successfully processed {success} file(s)");
    }
    if success > 0 || skipped > 0 {
        return format!("Processed {success}/{total} files ({failed} failed)");
    }
    "Failed to process any files".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exif::gps_tags_from_decimal;
    use little_exif::metadata::Metadata;
    use tempfile::TempDir;

    fn seed_jpeg(path: &Path) {
        image::RgbImage::from_pixel(1, 1, image::Rgb([10u8, 20u8, 30u8]))
            .save(path)
            .unwrap();
    }

    fn seed_jpeg_with_gps(path: &Path, lat: f64, lon: f64) {
        seed_jpeg(path);
        let mut metadata = Metadata::new();
        for tag in gps_tags_from_decimal(lat, lon) {
            metadata.set_tag(tag);
        }
        write_metadata(path, &metadata, ContainerKind::Jpeg).unwrap();
    }

    // ── build_message ────────────────────────────────────────────────

    #[test]
    fn message_full_success() {
        assert_eq!(build_message(3, 0, 0, 3), "Successfully processed 3 file(s)");
    }

    #[test]
    fn message_with_skips() {
        assert_eq!(
            build_message(2, 1, 0, 3),
            "Processed 2 file(s), skipped 1 with existing GPS data"
        );
    }

    #[test]
    fn message_partial_failure() {
        assert_eq!(build_message(2, 0, 1, 3), "Processed 2/3 files (1 failed)");
    }

    #[test]
    fn message_total_failure() {
        assert_eq!(build_message(0, 0, 3, 3), "Failed to process any files");
    }

    // ── source-level errors ──────────────────────────────────────────

    #[test]
    fn unsupported_source_aborts() {
        let err = transfer(
            Path::new("source.bmp"),
            &[PathBuf::from("target.jpg")],
            &TransferOptions::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, TransferError::UnsupportedFormat(_)));
    }

    #[test]
    fn missing_source_aborts() {
        let err = transfer(
            Path::new("/nonexistent/source.jpg"),
            &[PathBuf::from("target.jpg")],
            &TransferOptions::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, TransferError::Decode { .. }));
    }

    #[test]
    fn source_without_gps_aborts_before_targets() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.jpg");
        let target = dir.path().join("target.jpg");
        seed_jpeg(&source);
        seed_jpeg(&target);
        let before = std::fs::read(&target).unwrap();

        let err = transfer(
            &source,
            &[target.clone()],
            &TransferOptions::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, TransferError::NoSourceGps));
        assert_eq!(std::fs::read(&target).unwrap(), before);
    }

    // ── progress callback ────────────────────────────────────────────

    #[test]
    fn progress_fires_per_target_and_once_more() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.jpg");
        seed_jpeg_with_gps(&source, 48.858844, 2.294351);

        let t1 = dir.path().join("a.jpg");
        let t2 = dir.path().join("b.jpg");
        seed_jpeg(&t1);
        seed_jpeg(&t2);

        let mut calls: Vec<(usize, usize, String)> = Vec::new();
        let mut on_progress = |done: usize, total: usize, path: &str| {
            calls.push((done, total, path.to_string()));
        };

        let summary = transfer(
            &source,
            &[t1.clone(), t2.clone()],
            &TransferOptions::default(),
            Some(&mut on_progress),
        )
        .unwrap();

        assert_eq!(summary.success_count, 2);
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].0, 1);
        assert_eq!(calls[1].0, 2);
        assert_eq!(calls[0].2, t1.to_string_lossy());
        assert_eq!(calls[2], (2, 2, String::new()));
    }

    // ── per-target isolation ─────────────────────────────────────────

    #[test]
    fn corrupt_target_is_recorded_not_fatal() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.jpg");
        seed_jpeg_with_gps(&source, 40.4168, -3.7038);

        let good = dir.path().join("good.jpg");
        let bad = dir.path().join("bad.jpg");
        seed_jpeg(&good);
        std::fs::write(&bad, b"definitely not an image").unwrap();

        let summary = transfer(
            &source,
            &[good.clone(), bad.clone()],
            &TransferOptions::default(),
            None,
        )
        .unwrap();

        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].path, bad);
        assert_eq!(summary.failed[0].outcome, Outcome::Failed);
        assert!(summary.failed[0].error.is_some());
        assert_eq!(summary.message, "Processed 1/2 files (1 failed)");
    }

    #[test]
    fn unsupported_target_is_recorded_not_fatal() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.jpg");
        seed_jpeg_with_gps(&source, 40.4168, -3.7038);

        let summary = transfer(
            &source,
            &[dir.path().join("doc.pdf")],
            &TransferOptions::default(),
            None,
        )
        .unwrap();

        assert_eq!(summary.success_count, 0);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.message, "Failed to process any files");
    }

    // ── backups ──────────────────────────────────────────────────────

    #[test]
    fn backup_created_before_modification() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source.jpg");
        seed_jpeg_with_gps(&source, 48.2082, 16.3738);

        let target = dir.path().join("target.jpg");
        seed_jpeg(&target);
        let original_bytes = std::fs::read(&target).unwrap();

        let options = TransferOptions {
            backup_originals: true,
            ..Default::default()
        };
        let summary = transfer(&source, &[target.clone()], &options, None).unwrap();
        assert_eq!(summary.success_count, 1);

        let backup = dir.path().join("target.jpg.bak");
        assert!(backup.exists());
        assert_eq!(std::fs::read(&backup).unwrap(), original_bytes);
    }
}
