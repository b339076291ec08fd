use little_exif::exif_tag::ExifTag;
use little_exif::metadata::Metadata;

use super::gps::{is_gps_tag, is_internal_tag};
use super::reader::MetadataBlock;
use crate::error::TransferError;
use crate::transfer::TransferOptions;

/// Outcome of merging source metadata into a target's block.
#[derive(Debug)]
pub enum Merged {
    /// Target already has GPS and the overwrite policy forbids replacing
    /// it. The target file must not be touched.
    Skipped,
    /// The metadata to persist into the target.
    Write(Metadata),
}

/// Merge the source's GPS block (and optionally its date fields) into the
/// target's metadata.
///
/// little_exif has no tag removal, so the merged block is rebuilt from
/// scratch: every target tag outside the GPS block is copied over, then the
/// source GPS tags are set on top. Internal IFD pointers are dropped and
/// regenerated by the codec on write.
pub fn merge(
    source: &MetadataBlock,
    target: &MetadataBlock,
    options: &TransferOptions,
) -> Result<Merged, TransferError> {
    let gps_tags = source.gps_tags();
    if gps_tags.is_empty() {
        return Err(TransferError::NoSourceGps);
    }

    if target.has_gps() && !options.overwrite_existing_gps {
        return Ok(Merged::Skipped);
    }

    let mut merged = Metadata::new();

    for tag in &target.tags {
        if is_internal_tag(tag) || is_gps_tag(tag) {
            continue;
        }
        if options.copy_date && is_replaced_date_tag(tag, source) {
            continue;
        }
        merged.set_tag(tag.clone());
    }

    for tag in gps_tags {
        merged.set_tag(tag);
    }

    if options.copy_date {
        if let Some(value) = source.date_time_original() {
            merged.set_tag(ExifTag::DateTimeOriginal(value.to_string()));
        }
        if let Some(value) = source.date_time_digitized() {
            merged.set_tag(ExifTag::CreateDate(value.to_string()));
        }
        if let Some(value) = source.date_time() {
            merged.set_tag(ExifTag::ModifyDate(value.to_string()));
        }
    }

    Ok(Merged::Write(merged))
}

/// Whether this target tag is one of the three date fields the source will
/// overwrite. Date fields the source lacks stay untouched on the target.
fn is_replaced_date_tag(tag: &ExifTag, source: &MetadataBlock) -> bool {
    match tag {
        ExifTag::DateTimeOriginal(_) => source.date_time_original().is_some(),
        ExifTag::CreateDate(_) => source.date_time_digitized().is_some(),
        ExifTag::ModifyDate(_) => source.date_time().is_some(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exif::gps::gps_tags_from_decimal;

    fn block(tags: Vec<ExifTag>) -> MetadataBlock {
        MetadataBlock { tags }
    }

    fn source_with_gps() -> MetadataBlock {
        let mut tags = gps_tags_from_decimal(48.858844, 2.294351);
        tags.push(ExifTag::Make("Apple".to_string()));
        tags.push(ExifTag::DateTimeOriginal("2023:08:12 14:22:05".to_string()));
        tags.push(ExifTag::CreateDate("2023:08:12 14:22:05".to_string()));
        block(tags)
    }

    fn merged_tags(merged: Merged) -> Vec<ExifTag> {
        match merged {
            Merged::Write(metadata) => (&metadata).into_iter().cloned().collect(),
            Merged::Skipped => panic!("expected Write, got Skipped"),
        }
    }

    #[test]
    fn source_without_gps_is_an_error() {
        let source = block(vec![ExifTag::Make("Apple".to_string())]);
        let target = MetadataBlock::default();
        let err = merge(&source, &target, &TransferOptions::default()).unwrap_err();
        assert!(matches!(err, TransferError::NoSourceGps));
    }

    #[test]
    fn target_with_gps_is_skipped_by_default() {
        let source = source_with_gps();
        let target = block(gps_tags_from_decimal(40.0, -3.0));
        let merged = merge(&source, &target, &TransferOptions::default()).unwrap();
        assert!(matches!(merged, Merged::Skipped));
    }

    #[test]
    fn overwrite_replaces_existing_gps() {
        let source = source_with_gps();
        let target = block(gps_tags_from_decimal(40.0, -3.0));
        let options = TransferOptions {
            overwrite_existing_gps: true,
            ..Default::default()
        };

        let tags = merged_tags(merge(&source, &target, &options).unwrap());
        let lat_ref = tags.iter().find_map(|t| match t {
            ExifTag::GPSLatitudeRef(r) => Some(r.clone()),
            _ => None,
        });
        // 48.85 N replaces 40.0 N; check via the rational degrees value
        let lat_degrees = tags.iter().find_map(|t| match t {
            ExifTag::GPSLatitude(rats) => rats.first().map(|r| r.nominator),
            _ => None,
        });
        assert_eq!(lat_ref.as_deref(), Some("N"));
        assert_eq!(lat_degrees, Some(48));
    }

    #[test]
    fn unrelated_target_tags_pass_through() {
        let source = source_with_gps();
        let target = block(vec![
            ExifTag::Make("Nikon".to_string()),
            ExifTag::Model("D850".to_string()),
        ]);

        let tags = merged_tags(merge(&source, &target, &TransferOptions::default()).unwrap());
        assert!(tags.iter().any(|t| matches!(t, ExifTag::Make(s) if s == "Nikon")));
        assert!(tags.iter().any(|t| matches!(t, ExifTag::Model(s) if s == "D850")));
        // Source camera tags never leak into the target
        assert!(!tags.iter().any(|t| matches!(t, ExifTag::Make(s) if s == "Apple")));
    }

    #[test]
    fn interop_only_target_is_not_skipped() {
        // A camera JPEG usually carries an Interop IFD; its low tag IDs must
        // not be mistaken for an existing GPS block
        let source = source_with_gps();
        let target = block(vec![
            ExifTag::InteroperabilityIndex("R98".to_string()),
            ExifTag::Make("Canon".to_string()),
        ]);

        let merged = merge(&source, &target, &TransferOptions::default()).unwrap();
        assert!(matches!(merged, Merged::Write(_)), "GPS-less target was skipped");

        let tags = merged_tags(merged);
        assert!(tags.iter().any(|t| matches!(t, ExifTag::GPSLatitude(_))));
        assert!(
            tags.iter()
                .any(|t| matches!(t, ExifTag::InteroperabilityIndex(s) if s == "R98"))
        );
    }

    #[test]
    fn source_interop_tags_do_not_leak_as_gps() {
        let mut source_tags = gps_tags_from_decimal(48.858844, 2.294351);
        source_tags.push(ExifTag::InteroperabilityIndex("R98".to_string()));
        let source = block(source_tags);
        let target = MetadataBlock::default();

        let tags = merged_tags(merge(&source, &target, &TransferOptions::default()).unwrap());
        assert!(
            !tags
                .iter()
                .any(|t| matches!(t, ExifTag::InteroperabilityIndex(_)))
        );
    }

    #[test]
    fn empty_target_is_a_valid_base() {
        let source = source_with_gps();
        let target = MetadataBlock::default();

        let tags = merged_tags(merge(&source, &target, &TransferOptions::default()).unwrap());
        assert!(tags.iter().any(|t| matches!(t, ExifTag::GPSLatitude(_))));
        assert!(tags.iter().any(|t| matches!(t, ExifTag::GPSLongitude(_))));
    }

    #[test]
    fn dates_not_copied_by_default() {
        let source = source_with_gps();
        let target = block(vec![ExifTag::DateTimeOriginal(
            "2020:01:01 00:00:00".to_string(),
        )]);

        let tags = merged_tags(merge(&source, &target, &TransferOptions::default()).unwrap());
        assert!(
            tags.iter()
                .any(|t| matches!(t, ExifTag::DateTimeOriginal(s) if s == "2020:01:01 00:00:00"))
        );
    }

    #[test]
    fn copy_date_replaces_the_three_fields_verbatim() {
        let source = source_with_gps();
        let target = block(vec![
            ExifTag::DateTimeOriginal("2020:01:01 00:00:00".to_string()),
            ExifTag::ModifyDate("2020:01:02 00:00:00".to_string()),
        ]);
        let options = TransferOptions {
            copy_date: true,
            ..Default::default()
        };

        let tags = merged_tags(merge(&source, &target, &options).unwrap());
        assert!(
            tags.iter()
                .any(|t| matches!(t, ExifTag::DateTimeOriginal(s) if s == "2023:08:12 14:22:05"))
        );
        assert!(
            tags.iter()
                .any(|t| matches!(t, ExifTag::CreateDate(s) if s == "2023:08:12 14:22:05"))
        );
        // Source has no ModifyDate, so the target's survives untouched
        assert!(
            tags.iter()
                .any(|t| matches!(t, ExifTag::ModifyDate(s) if s == "2020:01:02 00:00:00"))
        );
    }

    #[test]
    fn merge_is_idempotent() {
        let source = source_with_gps();
        let target = block(vec![ExifTag::Make("Nikon".to_string())]);
        let options = TransferOptions {
            overwrite_existing_gps: true,
            copy_date: true,
            ..Default::default()
        };

        let once = merged_tags(merge(&source, &target, &options).unwrap());
        let twice = merged_tags(merge(&source, &block(once.clone()), &options).unwrap());
        assert_eq!(once.len(), twice.len());
    }
}
