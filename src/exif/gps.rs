use little_exif::exif_tag::ExifTag;
use little_exif::ifd::ExifTagGroup;
use little_exif::rational::uR64;

// GPS sub-IFD tag IDs occupy 0x0000..=0x001F.
const GPS_IFD_MAX_TAG: u16 = 0x001F;

/// Whether a tag belongs to the GPS sub-IFD.
///
/// Named GPS variants are matched directly; tags little_exif surfaces as
/// `Unknown*` carry their IFD group, which disambiguates low tag IDs that
/// other sub-IFDs reuse.
pub(crate) fn is_gps_tag(tag: &ExifTag) -> bool {
    match tag {
        ExifTag::GPSLatitudeRef(_)
        | ExifTag::GPSLatitude(_)
        | ExifTag::GPSLongitudeRef(_)
        | ExifTag::GPSLongitude(_)
        | ExifTag::GPSAltitudeRef(_)
        | ExifTag::GPSAltitude(_) => true,
        // IFD0 pointer to the GPS sub-IFD, not a GPS value tag
        ExifTag::GPSInfo(_) => false,
        // Interop IFD tags reuse the low IDs (0x0001, 0x0002); they must
        // not trip the GPS fallback below
        ExifTag::InteroperabilityIndex(..) | ExifTag::InteroperabilityVersion(..) => false,
        ExifTag::UnknownINT8U(_, _, group)
        | ExifTag::UnknownSTRING(_, _, group)
        | ExifTag::UnknownINT16U(_, _, group)
        | ExifTag::UnknownINT32U(_, _, group)
        | ExifTag::UnknownRATIONAL64U(_, _, group)
        | ExifTag::UnknownRATIONAL64S(_, _, group)
        | ExifTag::UnknownUNDEF(_, _, group) => matches!(group, ExifTagGroup::GPS),
        _ => tag.as_u16() <= GPS_IFD_MAX_TAG,
    }
}

/// Internal IFD offset pointers and thumbnail/strip bookkeeping tags.
/// These are regenerated by little_exif on serialization and must never be
/// copied by value into a rebuilt metadata block.
pub(crate) fn is_internal_tag(tag: &ExifTag) -> bool {
    matches!(
        tag,
        ExifTag::ExifOffset(_)
            | ExifTag::GPSInfo(_)
            | ExifTag::InteropOffset(_)
            | ExifTag::ThumbnailOffset(..)
            | ExifTag::ThumbnailLength(_)
            | ExifTag::StripOffsets(..)
            | ExifTag::StripByteCounts(_)
    )
}

/// Build the GPS tag set for a decimal-degree coordinate pair.
///
/// Latitude and longitude are encoded as degree/minute/second rational
/// triples with the hemisphere carried in the `*Ref` string tags.
pub fn gps_tags_from_decimal(latitude: f64, longitude: f64) -> Vec<ExifTag> {
    let lat_ref = if latitude >= 0.0 { "N" } else { "S" };
    let lon_ref = if longitude >= 0.0 { "E" } else { "W" };

    let (lat_d, lat_m, lat_sn, lat_sd) = decimal_to_dms(latitude.abs());
    let (lon_d, lon_m, lon_sn, lon_sd) = decimal_to_dms(longitude.abs());

    vec![
        ExifTag::GPSLatitudeRef(lat_ref.to_string()),
        ExifTag::GPSLatitude(vec![ur64(lat_d, 1), ur64(lat_m, 1), ur64(lat_sn, lat_sd)]),
        ExifTag::GPSLongitudeRef(lon_ref.to_string()),
        ExifTag::GPSLongitude(vec![ur64(lon_d, 1), ur64(lon_m, 1), ur64(lon_sn, lon_sd)]),
    ]
}

pub(crate) fn ur64(nominator: u32, denominator: u32) -> uR64 {
    uR64 {
        nominator,
        denominator,
    }
}

/// Convert decimal degrees to DMS (degrees, minutes, seconds_numerator,
/// seconds_denominator). Seconds use a 1/10000 denominator for sub-second
/// precision.
pub fn decimal_to_dms(decimal: f64) -> (u32, u32, u32, u32) {
    let d = decimal.abs();
    let degrees = d as u32;
    let minutes_full = (d - degrees as f64) * 60.0;
    let minutes = minutes_full as u32;
    let seconds = (minutes_full - minutes as f64) * 60.0;
    let seconds_num = (seconds * 10000.0).round() as u32;
    (degrees, minutes, seconds_num, 10000)
}

/// Convert DMS components to decimal degrees.
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    degrees + minutes / 60.0 + seconds / 3600.0
}
