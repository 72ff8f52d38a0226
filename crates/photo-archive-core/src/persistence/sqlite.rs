use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{Error, Result};
use crate::fingerprint::Fingerprint;

use super::models::{PictureRecord, StorageKind, StorageRecord};
use super::ArchiveRepository;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS pictures (
    id          INTEGER PRIMARY KEY,
    fingerprint TEXT NOT NULL UNIQUE,
    date_taken  TEXT NOT NULL,
    latitude    REAL,
    longitude   REAL,
    location    TEXT,
    width       INTEGER NOT NULL,
    height      INTEGER NOT NULL,
    mimetype    TEXT NOT NULL,
    bytes       INTEGER NOT NULL,
    description TEXT,
    created     TEXT NOT NULL,
    modified    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS storages (
    id          INTEGER PRIMARY KEY,
    kind        TEXT NOT NULL,
    hostname    TEXT NOT NULL,
    filepath    TEXT NOT NULL,
    memo        TEXT,
    fingerprint TEXT NOT NULL REFERENCES pictures (fingerprint),
    created     TEXT NOT NULL,
    modified    TEXT NOT NULL,
    UNIQUE (kind, hostname, filepath, fingerprint)
);
";

/// SQLite-backed [`ArchiveRepository`].
///
/// Writes accumulate in an explicit transaction which `commit` closes; the
/// next write opens a fresh one. Dropping the repository with an open
/// transaction rolls the uncommitted tail back, which is exactly the
/// crash semantics the periodic-commit policy relies on.
pub struct SqliteRepository {
    conn: Connection,
    in_txn: bool,
}

impl SqliteRepository {
    /// Open (creating if missing) the database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        conn.execute_batch(SCHEMA)?;
        info!("archive database opened at {}", path.as_ref().display());
        Ok(Self {
            conn,
            in_txn: false,
        })
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            in_txn: false,
        })
    }

    fn begin_if_needed(&mut self) -> Result<()> {
        if !self.in_txn {
            self.conn.execute_batch("BEGIN")?;
            self.in_txn = true;
        }
        Ok(())
    }

    fn picture_id(&self, fingerprint: &Fingerprint) -> Result<Option<i64>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM pictures WHERE fingerprint = ?1",
                params![fingerprint.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }
}

impl ArchiveRepository for SqliteRepository {
    fn find_picture_by_fingerprint(
        &mut self,
        fingerprint: &Fingerprint,
    ) -> Result<Option<PictureRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, fingerprint, date_taken, latitude, longitude, location,
                        width, height, mimetype, bytes, description, created, modified
                 FROM pictures WHERE fingerprint = ?1",
                params![fingerprint.as_str()],
                picture_from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn upsert_picture(&mut self, record: &PictureRecord) -> Result<PictureRecord> {
        self.begin_if_needed()?;

        let mut stored = record.clone();
        stored.modified = Utc::now();

        match self.picture_id(&record.fingerprint)? {
            Some(id) => {
                self.conn.execute(
                    "UPDATE pictures
                     SET date_taken = ?1, latitude = ?2, longitude = ?3, location = ?4,
                         width = ?5, height = ?6, mimetype = ?7, bytes = ?8,
                         description = ?9, modified = ?10
                     WHERE id = ?11",
                    params![
                        record.date_taken.to_rfc3339(),
                        record.latitude,
                        record.longitude,
                        record.location,
                        record.width,
                        record.height,
                        record.mimetype,
                        record.bytes as i64,
                        record.description,
                        stored.modified.to_rfc3339(),
                        id,
                    ],
                )?;
                stored.id = Some(id);
            }
            None => {
                self.conn.execute(
                    "INSERT INTO pictures (fingerprint, date_taken, latitude, longitude,
                                           location, width, height, mimetype, bytes,
                                           description, created, modified)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                    params![
                        record.fingerprint.as_str(),
                        record.date_taken.to_rfc3339(),
                        record.latitude,
                        record.longitude,
                        record.location,
                        record.width,
                        record.height,
                        record.mimetype,
                        record.bytes as i64,
                        record.description,
                        record.created.to_rfc3339(),
                        stored.modified.to_rfc3339(),
                    ],
                )?;
                stored.id = Some(self.conn.last_insert_rowid());
            }
        }

        Ok(stored)
    }

    fn upsert_storage(&mut self, record: &StorageRecord) -> Result<()> {
        self.begin_if_needed()?;

        if self.picture_id(&record.fingerprint)?.is_none() {
            return Err(Error::PictureNotFoundForStorage(
                record.fingerprint.to_string(),
            ));
        }

        let filepath = record.filepath.to_string_lossy();
        let modified = Utc::now().to_rfc3339();

        let updated = self.conn.execute(
            "UPDATE storages SET memo = ?1, modified = ?2
             WHERE kind = ?3 AND hostname = ?4 AND filepath = ?5 AND fingerprint = ?6",
            params![
                record.memo,
                modified,
                record.kind.as_str(),
                record.hostname,
                filepath,
                record.fingerprint.as_str(),
            ],
        )?;

        if updated == 0 {
            self.conn.execute(
                "INSERT INTO storages (kind, hostname, filepath, memo, fingerprint,
                                       created, modified)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.kind.as_str(),
                    record.hostname,
                    filepath,
                    record.memo,
                    record.fingerprint.as_str(),
                    record.created.to_rfc3339(),
                    modified,
                ],
            )?;
        }

        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if self.in_txn {
            self.conn.execute_batch("COMMIT")?;
            self.in_txn = false;
        }
        Ok(())
    }
}

fn picture_from_row(row: &Row<'_>) -> rusqlite::Result<PictureRecord> {
    Ok(PictureRecord {
        id: Some(row.get(0)?),
        fingerprint: Fingerprint::from_string(row.get(1)?),
        date_taken: timestamp_column(row, 2)?,
        latitude: row.get(3)?,
        longitude: row.get(4)?,
        location: row.get(5)?,
        width: row.get(6)?,
        height: row.get(7)?,
        mimetype: row.get(8)?,
        bytes: row.get::<_, i64>(9)? as u64,
        description: row.get(10)?,
        created: timestamp_column(row, 11)?,
        modified: timestamp_column(row, 12)?,
    })
}

fn timestamp_column(row: &Row<'_>, index: usize) -> rusqlite::Result<DateTime<Utc>> {
    let value: String = row.get(index)?;
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Read all storage records for a fingerprint, oldest first.
///
/// Not part of the engine's repository contract; used by reporting tools
/// and tests.
pub fn storages_for_fingerprint(
    repo: &SqliteRepository,
    fingerprint: &Fingerprint,
) -> Result<Vec<StorageRecord>> {
    let mut stmt = repo.conn.prepare(
        "SELECT id, kind, hostname, filepath, memo, fingerprint, created, modified
         FROM storages WHERE fingerprint = ?1 ORDER BY id",
    )?;

    let rows = stmt.query_map(params![fingerprint.as_str()], |row| {
        let kind: String = row.get(1)?;
        Ok(StorageRecord {
            id: Some(row.get(0)?),
            kind: StorageKind::from_str(&kind).unwrap_or(StorageKind::Original),
            hostname: row.get(2)?,
            filepath: PathBuf::from(row.get::<_, String>(3)?),
            memo: row.get(4)?,
            fingerprint: Fingerprint::from_string(row.get(5)?),
            created: timestamp_column(row, 6)?,
            modified: timestamp_column(row, 7)?,
        })
    })?;

    let mut storages = Vec::new();
    for row in rows {
        storages.push(row?);
    }
    Ok(storages)
}
