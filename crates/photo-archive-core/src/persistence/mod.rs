//! Abstract persistence of picture and storage records.
//!
//! The engine is written against [`ArchiveRepository`] and owns exactly one
//! repository per run; lookup-then-create is not atomic across concurrent
//! runs, which is an accepted single-writer limitation.

mod memory;
mod models;
mod sqlite;

#[cfg(test)]
mod tests;

pub use memory::MemoryRepository;
pub use models::{PictureRecord, StorageKind, StorageRecord};
pub use sqlite::{storages_for_fingerprint, SqliteRepository};

use crate::error::Result;
use crate::fingerprint::Fingerprint;

/// Persistence operations required by the archive engine.
///
/// `commit` is the transaction boundary: writes between commits are a
/// batch, and a killed run loses at most the uncommitted tail.
pub trait ArchiveRepository {
    /// Look up the canonical picture for a fingerprint
    fn find_picture_by_fingerprint(&mut self, fingerprint: &Fingerprint)
        -> Result<Option<PictureRecord>>;

    /// Insert or update a picture, returning it with its assigned id
    fn upsert_picture(&mut self, record: &PictureRecord) -> Result<PictureRecord>;

    /// Insert or update a storage record, keyed on
    /// `(kind, hostname, filepath, fingerprint)`.
    ///
    /// Fails with [`crate::Error::PictureNotFoundForStorage`] when no
    /// picture exists for the record's fingerprint; storages are always
    /// attached after their picture.
    fn upsert_storage(&mut self, record: &StorageRecord) -> Result<()>;

    /// Flush all pending writes
    fn commit(&mut self) -> Result<()>;
}
