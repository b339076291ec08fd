//! EXIF metadata reading, merging, and writing.
//!
//! The transfer pipeline is three steps, one per submodule:
//!
//! - [`read_metadata`] — snapshot a file's tag dictionary into a [`MetadataBlock`]
//! - [`merge`] — apply the skip/overwrite policy and build the block to write
//! - [`write_metadata`] — persist it through the format-appropriate container path
//!
//! GPS values move between files as raw rational DMS tags; the decimal-degree
//! helpers in [`gps`] exist for inspection and for callers constructing GPS
//! blocks from coordinates.

pub mod gps;
mod merge;
mod reader;
mod writer;

pub use gps::{decimal_to_dms, dms_to_decimal, gps_tags_from_decimal};
pub use merge::{Merged, merge};
pub use reader::{MetadataBlock, read_gps_decimal, read_metadata};
pub use writer::write_metadata;
