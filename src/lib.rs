//! # exif-transfer
//!
//! Copy GPS (and optionally date/time) EXIF metadata from one source photo
//! to any number of target photos, across JPEG, PNG, TIFF, and HEIC/HEIF
//! containers.
//!
//! ## Quick Start
//!
//! The batch entry point handles the full detect → read → merge → write flow
//! per target, with per-target failure isolation and progress reporting:
//!
//! ```rust,no_run
//! use exif_transfer::transfer::{transfer, TransferOptions};
//! use std::path::{Path, PathBuf};
//!
//! fn main() -> anyhow::Result<()> {
//!     let targets = vec![PathBuf::from("hike-01.jpg"), PathBuf::from("hike-02.heic")];
//!
//!     let summary = transfer(
//!         Path::new("phone-shot.jpg"), // has the GPS block
//!         &targets,
//!         &TransferOptions::default(),
//!         None,
//!     )?;
//!
//!     println!("{}", summary.message);
//!     for failure in &summary.failed {
//!         eprintln!("{}: {}", failure.path.display(), failure.error.as_deref().unwrap_or("?"));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! The pipeline steps are usable individually:
//!
//! ```rust,no_run
//! use exif_transfer::exif::{merge, read_metadata, write_metadata, Merged};
//! use exif_transfer::format::ContainerKind;
//! use exif_transfer::transfer::TransferOptions;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let source = Path::new("source.jpg");
//!     let target = Path::new("target.png");
//!
//!     let source_block = read_metadata(source, ContainerKind::from_path(source)?)?;
//!     let target_kind = ContainerKind::from_path(target)?;
//!     let target_block = read_metadata(target, target_kind)?;
//!
//!     if let Merged::Write(merged) = merge(&source_block, &target_block, &TransferOptions::default())? {
//!         write_metadata(target, &merged, target_kind)?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Formats
//!
//! | Format | EXIF Strategy |
//! |--------|---------------|
//! | JPEG (`.jpg`, `.jpeg`) | APP1 segment via container surgery |
//! | PNG (`.png`) | eXIf chunk via container surgery |
//! | TIFF (`.tif`, `.tiff`) | Native container rewrite |
//! | HEIC/HEIF (`.heic`, `.heif`) | Native container rewrite |
//!
//! Extension detection is case-insensitive throughout.
//!
//! ## Modules
//!
//! - [`format`] — container kind detection and target collection
//! - [`exif`] — metadata reading, merging, and writing
//! - [`transfer`] — the batch orchestrator
//! - [`config`] — configuration loading/saving
//! - [`error`] — the error taxonomy

pub mod config;
pub mod error;
pub mod exif;
pub mod format;
pub mod transfer;

pub use error::TransferError;
