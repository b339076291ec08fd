use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::TransferError;

/// Supported image extensions.
const IMAGE_EXTENSIONS: &[&str] = &[
    // Direct EXIF block in the container
    "jpg", "jpeg", "png", "tif", "tiff",
    // HEIC/HEIF — EXIF lives in an item box inside the HEIF container
    "heic", "heif",
];

/// The container family of an image file, determined by its extension.
///
/// JPEG, PNG, and TIFF carry their EXIF block where the codec can reach it
/// directly; HEIC/HEIF wrap it in the HEIF box structure and need the
/// container-aware read/write path.
///
/// Extension matching is case-insensitive: `photo.JPG` and `photo.jpg`
/// detect identically.
///
/// # Example
///
/// ```rust
/// use exif_transfer::format::ContainerKind;
/// use std::path::Path;
///
/// let kind = ContainerKind::from_path(Path::new("photo.HEIC")).unwrap();
/// assert_eq!(kind, ContainerKind::Heic);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// JPEG — EXIF in an APP1 segment
    Jpeg,
    /// PNG — EXIF in an eXIf chunk
    Png,
    /// TIFF — the file itself is the TIFF/EXIF structure
    Tiff,
    /// HEIC/HEIF — EXIF in a metadata item box
    Heic,
}

impl ContainerKind {
    /// Determine the container kind from a file path extension.
    ///
    /// Fails with [`TransferError::UnsupportedFormat`] for unknown
    /// extensions or paths without one.
    pub fn from_path(path: &Path) -> Result<Self, TransferError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .ok_or_else(|| TransferError::UnsupportedFormat(path.to_path_buf()))?;

        match ext.as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "tif" | "tiff" => Ok(Self::Tiff),
            "heic" | "heif" => Ok(Self::Heic),
            _ => Err(TransferError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Collect supported image files from the given paths.
///
/// Accepts a mix of file paths and directory paths. Directories are walked
/// recursively (following symlinks); only files with supported extensions
/// are included.
///
/// # Example
///
/// ```rust,no_run
/// use exif_transfer::format::collect_targets;
/// use std::path::PathBuf;
///
/// let targets = collect_targets(&[
///     PathBuf::from("photo.jpg"),
///     PathBuf::from("./album/"),
/// ]);
/// println!("Found {} images", targets.len());
/// ```
pub fn collect_targets(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_supported_image(path) {
                images.push(path.clone());
            } else {
                log::warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file() && is_supported_image(p) {
                    images.push(p.to_path_buf());
                }
            }
        } else {
            log::warn!("Path does not exist: {}", path.display());
        }
    }

    images
}

/// Check if a file has a supported image extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
