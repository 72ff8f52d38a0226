use chrono::Utc;

use crate::error::{Error, Result};
use crate::fingerprint::Fingerprint;

use super::models::{PictureRecord, StorageRecord};
use super::ArchiveRepository;

/// In-memory [`ArchiveRepository`] for tests and dry runs.
///
/// Mirrors the upsert semantics of the SQLite backend; `commit` only
/// counts invocations so tests can assert on batching behaviour.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    pictures: Vec<PictureRecord>,
    storages: Vec<StorageRecord>,
    next_picture_id: i64,
    next_storage_id: i64,
    commits: usize,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            pictures: Vec::new(),
            storages: Vec::new(),
            next_picture_id: 1,
            next_storage_id: 1,
            commits: 0,
        }
    }

    pub fn pictures(&self) -> &[PictureRecord] {
        &self.pictures
    }

    pub fn storages(&self) -> &[StorageRecord] {
        &self.storages
    }

    /// Number of times `commit` has been called
    pub fn commits(&self) -> usize {
        self.commits
    }

    fn has_picture(&self, fingerprint: &Fingerprint) -> bool {
        self.pictures.iter().any(|p| &p.fingerprint == fingerprint)
    }
}

impl ArchiveRepository for MemoryRepository {
    fn find_picture_by_fingerprint(
        &mut self,
        fingerprint: &Fingerprint,
    ) -> Result<Option<PictureRecord>> {
        Ok(self
            .pictures
            .iter()
            .find(|p| &p.fingerprint == fingerprint)
            .cloned())
    }

    fn upsert_picture(&mut self, record: &PictureRecord) -> Result<PictureRecord> {
        let mut stored = record.clone();
        stored.modified = Utc::now();

        match self
            .pictures
            .iter_mut()
            .find(|p| p.fingerprint == record.fingerprint)
        {
            Some(existing) => {
                stored.id = existing.id;
                stored.created = existing.created;
                *existing = stored.clone();
            }
            None => {
                stored.id = Some(self.next_picture_id);
                self.next_picture_id += 1;
                self.pictures.push(stored.clone());
            }
        }

        Ok(stored)
    }

    fn upsert_storage(&mut self, record: &StorageRecord) -> Result<()> {
        if !self.has_picture(&record.fingerprint) {
            return Err(Error::PictureNotFoundForStorage(
                record.fingerprint.to_string(),
            ));
        }

        let mut stored = record.clone();
        stored.modified = Utc::now();

        match self.storages.iter_mut().find(|s| {
            s.kind == record.kind
                && s.hostname == record.hostname
                && s.filepath == record.filepath
                && s.fingerprint == record.fingerprint
        }) {
            Some(existing) => {
                stored.id = existing.id;
                stored.created = existing.created;
                *existing = stored;
            }
            None => {
                stored.id = Some(self.next_storage_id);
                self.next_storage_id += 1;
                self.storages.push(stored);
            }
        }

        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.commits += 1;
        Ok(())
    }
}
