//! Canonical backup path planning.
//!
//! The rest of the system detects "already copied" purely by checking the
//! planned destination, so the layout must be a deterministic function of
//! the capture date, the picture's database id and its mimetype:
//!
//! `YYYY/MM-MonthName/YYYY-MM-DD-<id zero-padded to 7 digits><ext>`

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

/// Plans where a fingerprinted picture lives under the archive root
#[derive(Debug, Clone)]
pub struct BackupPlanner {
    archive_root: PathBuf,
}

impl BackupPlanner {
    pub fn new<P: AsRef<Path>>(archive_root: P) -> Self {
        Self {
            archive_root: archive_root.as_ref().to_path_buf(),
        }
    }

    /// Relative path of a picture inside the archive volume
    pub fn plan_path(
        &self,
        date_taken: DateTime<Utc>,
        picture_id: i64,
        mimetype: &str,
    ) -> PathBuf {
        let year = date_taken.format("%Y").to_string();
        let month = date_taken.format("%m-%B").to_string();
        let name = format!(
            "{}-{:07}{}",
            date_taken.format("%Y-%m-%d"),
            picture_id,
            extension_for(mimetype)
        );

        PathBuf::from(year).join(month).join(name)
    }

    /// Absolute destination under the archive root
    pub fn absolute_path(
        &self,
        date_taken: DateTime<Utc>,
        picture_id: i64,
        mimetype: &str,
    ) -> PathBuf {
        self.archive_root
            .join(self.plan_path(date_taken, picture_id, mimetype))
    }
}

/// Extension (with leading dot) for a mimetype.
///
/// JPEG is pinned to `.jpg`: generic inference offers `.jpe`/`.jpeg`
/// variants and the archive must collapse them to one spelling. Everything
/// else is best-effort, empty when nothing is known.
fn extension_for(mimetype: &str) -> String {
    if mimetype.eq_ignore_ascii_case("image/jpeg") {
        return ".jpg".to_string();
    }

    mime_guess::get_mime_extensions_str(mimetype)
        .and_then(|exts| exts.first())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}

// -- Tests --
