#[allow(clippy::module_inception)]
#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    use super::super::models::{PictureRecord, StorageKind, StorageRecord};
    use super::super::sqlite::{storages_for_fingerprint, SqliteRepository};
    use super::super::{ArchiveRepository, MemoryRepository};
    use crate::error::Error;
    use crate::fingerprint::Fingerprint;
    use crate::metadata::ImageMetadata;

    fn fingerprint(tag: &str) -> Fingerprint {
        Fingerprint::from_string(format!("fp-{}", tag))
    }

    fn picture(tag: &str) -> PictureRecord {
        let metadata = ImageMetadata {
            mimetype: "image/jpeg".to_string(),
            width: 4000,
            height: 3000,
            date_taken: Utc.with_ymd_and_hms(2015, 8, 9, 20, 46, 50).unwrap(),
            latitude: Some(38.889),
            longitude: Some(-77.035),
        };
        PictureRecord::new(fingerprint(tag), &metadata, 2_048_576)
    }

    fn storage(tag: &str, kind: StorageKind, filepath: &str) -> StorageRecord {
        StorageRecord::new(kind, "testhost", PathBuf::from(filepath), fingerprint(tag))
    }

    #[test]
    fn test_upsert_picture_assigns_id() {
        let mut repo = SqliteRepository::open_in_memory().unwrap();

        let stored = repo.upsert_picture(&picture("a")).unwrap();
        assert!(stored.id.is_some());

        let found = repo
            .find_picture_by_fingerprint(&fingerprint("a"))
            .unwrap()
            .unwrap();
        assert_eq!(found.id, stored.id);
        assert_eq!(found.mimetype, "image/jpeg");
        assert_eq!(found.bytes, 2_048_576);
        assert_eq!(found.latitude, Some(38.889));
    }

    #[test]
    fn test_upsert_picture_twice_keeps_one_record() {
        let mut repo = SqliteRepository::open_in_memory().unwrap();

        let first = repo.upsert_picture(&picture("a")).unwrap();
        let second = repo.upsert_picture(&picture("a")).unwrap();

        assert_eq!(first.id, second.id);
    }

    #[test]
    fn test_missing_picture_lookup_is_none() {
        let mut repo = SqliteRepository::open_in_memory().unwrap();
        assert!(repo
            .find_picture_by_fingerprint(&fingerprint("missing"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_storage_requires_picture() {
        let mut repo = SqliteRepository::open_in_memory().unwrap();

        let result = repo.upsert_storage(&storage("a", StorageKind::Original, "/photos/a.jpg"));
        assert!(matches!(result, Err(Error::PictureNotFoundForStorage(_))));
    }

    #[test]
    fn test_storage_upsert_does_not_duplicate() {
        let mut repo = SqliteRepository::open_in_memory().unwrap();
        repo.upsert_picture(&picture("a")).unwrap();

        let record = storage("a", StorageKind::Original, "/photos/a.jpg");
        repo.upsert_storage(&record).unwrap();
        repo.upsert_storage(&record).unwrap();

        let storages = storages_for_fingerprint(&repo, &fingerprint("a")).unwrap();
        assert_eq!(storages.len(), 1);
        assert_eq!(storages[0].hostname, "testhost");
    }

    #[test]
    fn test_distinct_paths_make_distinct_storages() {
        let mut repo = SqliteRepository::open_in_memory().unwrap();
        repo.upsert_picture(&picture("a")).unwrap();

        repo.upsert_storage(&storage("a", StorageKind::Original, "/photos/a.jpg"))
            .unwrap();
        repo.upsert_storage(&storage("a", StorageKind::Original, "/photos/b.jpg"))
            .unwrap();
        repo.upsert_storage(&storage(
            "a",
            StorageKind::ArchiveVolume,
            "/archive/2015/08-August/2015-08-09-0000001.jpg",
        ))
        .unwrap();

        let storages = storages_for_fingerprint(&repo, &fingerprint("a")).unwrap();
        assert_eq!(storages.len(), 3);
        assert_eq!(
            storages
                .iter()
                .filter(|s| s.kind == StorageKind::ArchiveVolume)
                .count(),
            1
        );
    }

    #[test]
    fn test_commit_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("archive.db");

        {
            let mut repo = SqliteRepository::open(&db_path).unwrap();
            repo.upsert_picture(&picture("a")).unwrap();
            repo.commit().unwrap();

            // Uncommitted tail, dropped with the repository
            repo.upsert_picture(&picture("b")).unwrap();
        }

        let mut repo = SqliteRepository::open(&db_path).unwrap();
        assert!(repo
            .find_picture_by_fingerprint(&fingerprint("a"))
            .unwrap()
            .is_some());
        assert!(repo
            .find_picture_by_fingerprint(&fingerprint("b"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_memory_repository_matches_semantics() {
        let mut repo = MemoryRepository::new();

        assert!(matches!(
            repo.upsert_storage(&storage("a", StorageKind::Original, "/photos/a.jpg")),
            Err(Error::PictureNotFoundForStorage(_))
        ));

        let stored = repo.upsert_picture(&picture("a")).unwrap();
        assert_eq!(stored.id, Some(1));
        repo.upsert_picture(&picture("a")).unwrap();
        assert_eq!(repo.pictures().len(), 1);

        let record = storage("a", StorageKind::Original, "/photos/a.jpg");
        repo.upsert_storage(&record).unwrap();
        repo.upsert_storage(&record).unwrap();
        assert_eq!(repo.storages().len(), 1);

        repo.commit().unwrap();
        assert_eq!(repo.commits(), 1);
    }
}
