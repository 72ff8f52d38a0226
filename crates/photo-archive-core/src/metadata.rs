//! Image metadata extraction seam.
//!
//! EXIF and GPS decoding live behind the [`MetadataExtractor`] trait; the
//! engine only depends on the fixed [`ImageMetadata`] shape. The default
//! extractor probes dimensions with the `image` crate and falls back to
//! filesystem timestamps when no embedded capture time is available.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::discovery::mimetype_of;
use crate::error::{Error, Result};

/// Metadata describing a single image file
#[derive(Debug, Clone, PartialEq)]
pub struct ImageMetadata {
    /// Mimetype, e.g. `image/jpeg`
    pub mimetype: String,

    /// Pixel width
    pub width: u32,

    /// Pixel height
    pub height: u32,

    /// When the photograph was taken. Always present: falls back to the
    /// filesystem creation (then modification) time when the image embeds
    /// no timestamp.
    pub date_taken: DateTime<Utc>,

    /// GPS latitude in decimal degrees, if known
    pub latitude: Option<f64>,

    /// GPS longitude in decimal degrees, if known
    pub longitude: Option<f64>,
}

/// Extracts [`ImageMetadata`] from a file on disk
pub trait MetadataExtractor {
    fn extract(&self, path: &Path) -> Result<ImageMetadata>;
}

/// Default extractor: dimension probing plus filesystem timestamps.
///
/// Decoding failures (truncated or corrupt images) surface as
/// [`Error::Extraction`] so a bulk run can count and skip them.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileMetadataExtractor;

impl MetadataExtractor for FileMetadataExtractor {
    fn extract(&self, path: &Path) -> Result<ImageMetadata> {
        let (width, height) = image::image_dimensions(path).map_err(|source| Error::Extraction {
            path: path.to_path_buf(),
            source,
        })?;

        let mimetype = mimetype_of(path)
            .unwrap_or("application/octet-stream")
            .to_string();

        Ok(ImageMetadata {
            mimetype,
            width,
            height,
            date_taken: filesystem_timestamp(path)?,
            latitude: None,
            longitude: None,
        })
    }
}

/// Best available filesystem timestamp for a file, preferring creation time
fn filesystem_timestamp(path: &Path) -> Result<DateTime<Utc>> {
    let meta = fs::metadata(path)?;
    let stamp = meta.created().or_else(|_| meta.modified())?;
    Ok(DateTime::<Utc>::from(stamp))
}

// -- Tests --
