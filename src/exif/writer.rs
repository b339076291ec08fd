use img_parts::jpeg::Jpeg;
use img_parts::png::Png;
use img_parts::{Bytes, ImageEXIF};
use little_exif::filetype::FileExtension;
use little_exif::metadata::Metadata;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::error::TransferError;
use crate::format::ContainerKind;

// little_exif as_u8_vec(JPEG) returns: [APP1 marker 2B][length 2B][Exif\0\0 6B][TIFF data]
// img-parts set_exif() expects just the TIFF data (after Exif\0\0)
const APP1_HEADER_SIZE: usize = 10;

/// Persist a merged metadata block into the target file.
///
/// Every path writes to a temporary file in the target's directory and
/// atomically renames over the original, so a failed write leaves the
/// target untouched.
///
/// Strategy per container:
/// - JPEG/PNG: parse the container with img-parts, install the serialized
///   TIFF payload into the EXIF slot (APP1 segment / eXIf chunk), re-encode.
///   little_exif's own PNG write path silently fails when the file has no
///   EXIF chunk yet, so PNG always goes through img-parts.
/// - TIFF/HEIC: little_exif rewrites the container itself; it runs against
///   a scratch copy which then replaces the original.
pub fn write_metadata(
    path: &Path,
    metadata: &Metadata,
    kind: ContainerKind,
) -> Result<(), TransferError> {
    match kind {
        ContainerKind::Jpeg => write_jpeg(path, metadata),
        ContainerKind::Png => write_png(path, metadata),
        ContainerKind::Tiff | ContainerKind::Heic => write_native(path, metadata),
    }
}

/// Serialize the metadata block to the raw TIFF payload img-parts expects.
fn tiff_payload(path: &Path, metadata: &Metadata) -> Result<Vec<u8>, TransferError> {
    let full_app1 = metadata
        .as_u8_vec(FileExtension::JPEG)
        .map_err(|e| TransferError::write(path, format!("failed to encode EXIF: {e:?}")))?;

    if full_app1.len() <= APP1_HEADER_SIZE {
        return Err(TransferError::write(path, "encoded EXIF block is empty"));
    }
    Ok(full_app1[APP1_HEADER_SIZE..].to_vec())
}

fn write_jpeg(path: &Path, metadata: &Metadata) -> Result<(), TransferError> {
    let file_bytes = std::fs::read(path)
        .map_err(|e| TransferError::decode(path, format!("cannot read file: {e}")))?;

    let mut jpeg = Jpeg::from_bytes(Bytes::from(file_bytes))
        .map_err(|e| TransferError::decode(path, format!("failed to parse JPEG: {e}")))?;

    // Remember where the EXIF segment was originally positioned
    let orig_exif_pos = find_exif_segment_pos(&jpeg);

    let payload = tiff_payload(path, metadata)?;
    jpeg.set_exif(Some(Bytes::from(payload)));

    // set_exif() inserts at position 3, which may be after an XMP APP1.
    // Move the EXIF segment back to its original position so EXIF comes
    // before XMP (required by many EXIF parsers).
    if let Some(new_pos) = find_exif_segment_pos(&jpeg) {
        let target_pos = orig_exif_pos.unwrap_or(1); // default: right after APP0
        if target_pos < new_pos {
            let segments = jpeg.segments_mut();
            let seg = segments.remove(new_pos);
            segments.insert(target_pos, seg);
        }
    }

    let output = jpeg.encoder().bytes();
    persist_atomically(path, &output)
}

fn write_png(path: &Path, metadata: &Metadata) -> Result<(), TransferError> {
    let file_bytes = std::fs::read(path)
        .map_err(|e| TransferError::decode(path, format!("cannot read file: {e}")))?;

    let mut png = Png::from_bytes(Bytes::from(file_bytes))
        .map_err(|e| TransferError::decode(path, format!("failed to parse PNG: {e}")))?;

    let payload = tiff_payload(path, metadata)?;
    png.set_exif(Some(Bytes::from(payload)));

    let mut output = Vec::new();
    png.encoder()
        .write_to(&mut output)
        .map_err(|e| TransferError::write(path, format!("failed to encode PNG: {e}")))?;

    persist_atomically(path, &output)
}

/// TIFF and HEIC go through little_exif's own container rewrite. It works
/// in place, so it runs against a scratch copy that keeps the original
/// extension (the codec detects the filetype from it).
fn write_native(path: &Path, metadata: &Metadata) -> Result<(), TransferError> {
    let original = std::fs::read(path)
        .map_err(|e| TransferError::decode(path, format!("cannot read file: {e}")))?;

    let parent = parent_dir(path);
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    let mut temp = tempfile::Builder::new()
        .prefix(".exif-transfer-")
        .suffix(&format!(".{ext}"))
        .tempfile_in(parent)?;
    temp.write_all(&original)?;
    temp.flush()?;

    let temp_path = temp.path().to_path_buf();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        metadata.write_to_file(&temp_path)
    }));

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            return Err(TransferError::write(path, format!("failed to write EXIF: {e:?}")));
        }
        Err(_) => {
            return Err(TransferError::write(path, "EXIF codec panicked during write"));
        }
    }

    temp.persist(path)
        .map_err(|e| TransferError::write(path, e.to_string()))?;
    Ok(())
}

/// Find the position of the EXIF APP1 segment in a JPEG.
/// EXIF segments have marker 0xE1 (APP1) and contents starting with "Exif\0\0".
fn find_exif_segment_pos(jpeg: &Jpeg) -> Option<usize> {
    const EXIF_PREFIX: &[u8] = b"Exif\0\0";
    jpeg.segments()
        .iter()
        .position(|s| s.marker() == 0xE1 && s.contents().starts_with(EXIF_PREFIX))
}

/// Write the full output through a temp file in the same directory, then
/// rename over the original.
fn persist_atomically(path: &Path, bytes: &[u8]) -> Result<(), TransferError> {
    let mut temp = NamedTempFile::new_in(parent_dir(path))?;
    temp.write_all(bytes)?;
    temp.persist(path)
        .map_err(|e| TransferError::write(path, e.to_string()))?;
    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}
