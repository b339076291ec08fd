use little_exif::exif_tag::ExifTag;
use little_exif::metadata::Metadata;
use nom_exif::{ExifIter, LatLng, MediaParser, MediaSource};
use std::path::Path;

use super::gps::is_gps_tag;
use crate::error::TransferError;
use crate::format::ContainerKind;

const JPEG_SOI: &[u8] = &[0xFF, 0xD8];
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const TIFF_LE: &[u8] = b"II*\0";
const TIFF_BE: &[u8] = b"MM\0*";

/// A snapshot of an image's EXIF tag dictionary.
///
/// Everything outside the GPS block and the three date fields is opaque
/// passthrough: the merger copies those tags back untouched. An empty
/// block is a valid base for a target that never had metadata.
#[derive(Debug, Clone, Default)]
pub struct MetadataBlock {
    pub(crate) tags: Vec<ExifTag>,
}

impl MetadataBlock {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the block carries a non-empty GPS sub-IFD.
    pub fn has_gps(&self) -> bool {
        self.tags.iter().any(is_gps_tag)
    }

    /// Clones of all GPS sub-IFD tags.
    pub fn gps_tags(&self) -> Vec<ExifTag> {
        self.tags
            .iter()
            .filter(|t| is_gps_tag(t))
            .cloned()
            .collect()
    }

    /// The DateTimeOriginal value, if present.
    pub fn date_time_original(&self) -> Option<&str> {
        self.tags.iter().find_map(|t| match t {
            ExifTag::DateTimeOriginal(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// The DateTimeDigitized (CreateDate) value, if present.
    pub fn date_time_digitized(&self) -> Option<&str> {
        self.tags.iter().find_map(|t| match t {
            ExifTag::CreateDate(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// The DateTime (ModifyDate) value, if present.
    pub fn date_time(&self) -> Option<&str> {
        self.tags.iter().find_map(|t| match t {
            ExifTag::ModifyDate(s) => Some(s.as_str()),
            _ => None,
        })
    }
}

/// Read the EXIF metadata block from an image file.
///
/// The container signature is verified before the codec runs, so a file
/// with a lying extension fails with [`TransferError::Decode`] instead of
/// confusing the parser. A structurally valid image without a parseable
/// EXIF block fails with [`TransferError::NoMetadata`]; callers treat that
/// as an empty base for targets.
pub fn read_metadata(path: &Path, kind: ContainerKind) -> Result<MetadataBlock, TransferError> {
    let header = read_header(path)?;
    verify_signature(path, kind, &header)?;

    match parse_exif(path) {
        Some(metadata) => {
            let tags: Vec<ExifTag> = (&metadata).into_iter().cloned().collect();
            if tags.is_empty() {
                return Err(TransferError::NoMetadata(path.to_path_buf()));
            }
            log::debug!("Loaded {} EXIF tags from {}", tags.len(), path.display());
            Ok(MetadataBlock { tags })
        }
        None => Err(TransferError::NoMetadata(path.to_path_buf())),
    }
}

fn read_header(path: &Path) -> Result<Vec<u8>, TransferError> {
    let mut bytes = std::fs::read(path)
        .map_err(|e| TransferError::decode(path, format!("cannot read file: {e}")))?;
    if bytes.len() < 12 {
        return Err(TransferError::decode(path, "file too short to be an image"));
    }
    bytes.truncate(12);
    Ok(bytes)
}

fn verify_signature(
    path: &Path,
    kind: ContainerKind,
    header: &[u8],
) -> Result<(), TransferError> {
    let ok = match kind {
        ContainerKind::Jpeg => header.starts_with(JPEG_SOI),
        ContainerKind::Png => header.starts_with(PNG_SIGNATURE),
        ContainerKind::Tiff => header.starts_with(TIFF_LE) || header.starts_with(TIFF_BE),
        // ISO BMFF: [size:4]["ftyp"][brand...]
        ContainerKind::Heic => &header[4..8] == b"ftyp",
    };

    if ok {
        Ok(())
    } else {
        Err(TransferError::decode(
            path,
            format!("not a valid {kind:?} container"),
        ))
    }
}

/// Parse EXIF with little_exif, suppressing the panics it can raise on
/// malformed input.
fn parse_exif(path: &Path) -> Option<Metadata> {
    let path_owned = path.to_path_buf();
    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(|_| {}));
    let result = std::panic::catch_unwind(move || Metadata::new_from_path(&path_owned));
    std::panic::set_hook(prev_hook);

    match result {
        Ok(Ok(m)) => Some(m),
        Ok(Err(e)) => {
            log::debug!("little_exif could not parse {}: {e}", path.display());
            None
        }
        Err(_) => {
            log::debug!("little_exif panicked parsing {}", path.display());
            None
        }
    }
}

/// Read the GPS coordinate of an image as decimal degrees.
///
/// Returns `Ok(None)` when the image has no GPS block. This is the
/// inspection path (logging, `--show-gps`); the transfer pipeline itself
/// moves the raw GPS tags without converting them.
pub fn read_gps_decimal(path: &Path) -> Result<Option<(f64, f64)>, TransferError> {
    let mut parser = MediaParser::new();
    let ms = MediaSource::file_path(path)
        .map_err(|e| TransferError::decode(path, format!("cannot open file: {e}")))?;

    let iter: ExifIter = match parser.parse(ms) {
        Ok(iter) => iter,
        Err(_) => {
            log::debug!("No EXIF data found in {}", path.display());
            return Ok(None);
        }
    };

    let gps = iter.parse_gps_info().ok().flatten();
    Ok(gps.map(|g| {
        (
            latlng_to_decimal(&g.latitude, g.latitude_ref),
            latlng_to_decimal(&g.longitude, g.longitude_ref),
        )
    }))
}

/// Convert a nom-exif LatLng (3 URationals: deg, min, sec) to decimal degrees.
fn latlng_to_decimal(latlng: &LatLng, reference: char) -> f64 {
    let degrees = latlng.0.0 as f64 / latlng.0.1 as f64;
    let minutes = latlng.1.0 as f64 / latlng.1.1 as f64;
    let seconds = latlng.2.0 as f64 / latlng.2.1 as f64;

    let mut coord = degrees + minutes / 60.0 + seconds / 3600.0;

    if reference == 'S' || reference == 'W' {
        coord = -coord;
    }

    coord
}
