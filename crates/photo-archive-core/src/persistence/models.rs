use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::fingerprint::Fingerprint;
use crate::metadata::ImageMetadata;

/// Where a physical copy of a picture lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// The source location the picture was discovered at
    Original,

    /// A secondary backup location
    Backup,

    /// A cloud location, e.g. S3 or Google Drive
    Cloud,

    /// The durable attached archive volume backups are written to
    ArchiveVolume,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Original => "ORIGINAL",
            StorageKind::Backup => "BACKUP",
            StorageKind::Cloud => "CLOUD",
            StorageKind::ArchiveVolume => "ARCHIVE_VOLUME",
        }
    }

    pub fn from_str(value: &str) -> Option<StorageKind> {
        match value {
            "ORIGINAL" => Some(StorageKind::Original),
            "BACKUP" => Some(StorageKind::Backup),
            "CLOUD" => Some(StorageKind::Cloud),
            "ARCHIVE_VOLUME" => Some(StorageKind::ArchiveVolume),
            _ => None,
        }
    }
}

/// The canonical identity of a photograph, unique per fingerprint.
///
/// Exactly one record exists per distinct fingerprint no matter how many
/// copies of the file exist on disk. This subsystem never deletes one;
/// `location` is filled in later by the out-of-band geocoder.
#[derive(Debug, Clone, PartialEq)]
pub struct PictureRecord {
    /// Database id, assigned on first upsert
    pub id: Option<i64>,

    /// Content fingerprint, the unique dedup key
    pub fingerprint: Fingerprint,

    /// When the photograph was taken
    pub date_taken: DateTime<Utc>,

    /// GPS coordinates in decimal degrees, if known
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// Reverse-geocoded location name, once known
    pub location: Option<String>,

    /// Pixel dimensions
    pub width: u32,
    pub height: u32,

    /// Mimetype, e.g. `image/jpeg`
    pub mimetype: String,

    /// File size in bytes
    pub bytes: u64,

    /// Free-form description
    pub description: Option<String>,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl PictureRecord {
    /// Build a fresh record from extracted metadata
    pub fn new(fingerprint: Fingerprint, metadata: &ImageMetadata, bytes: u64) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            fingerprint,
            date_taken: metadata.date_taken,
            latitude: metadata.latitude,
            longitude: metadata.longitude,
            location: None,
            width: metadata.width,
            height: metadata.height,
            mimetype: metadata.mimetype.clone(),
            bytes,
            description: None,
            created: now,
            modified: now,
        }
    }
}

/// One physical location of a picture.
///
/// Many storage records may reference one picture; the
/// `(kind, hostname, filepath)` triple is unique per fingerprint and
/// recurring discoveries update the existing row instead of duplicating it.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageRecord {
    /// Database id, assigned on first upsert
    pub id: Option<i64>,

    pub kind: StorageKind,

    /// Machine the copy lives on
    pub hostname: String,

    /// Absolute path of the copy on that machine
    pub filepath: PathBuf,

    /// Free-form operator note
    pub memo: Option<String>,

    /// Fingerprint of the owning picture
    pub fingerprint: Fingerprint,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl StorageRecord {
    pub fn new(
        kind: StorageKind,
        hostname: &str,
        filepath: PathBuf,
        fingerprint: Fingerprint,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            kind,
            hostname: hostname.to_string(),
            filepath,
            memo: None,
            fingerprint,
            created: now,
            modified: now,
        }
    }
}
