//! The archival engine: walk, fingerprint, look up, plan, copy, record.
//!
//! Processing is single-threaded and synchronous; one node runs to
//! completion before the next starts, and the repository is owned by a
//! single run and threaded through explicitly.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use filetime::FileTime;
use log::{debug, info, warn};

use crate::config::Config;
use crate::discovery::{is_image, DirectoryWalker, Node};
use crate::error::{Error, Result};
use crate::fingerprint::fingerprint;
use crate::logging::{log_fs_modification, log_item_error};
use crate::metadata::{FileMetadataExtractor, MetadataExtractor};
use crate::persistence::{ArchiveRepository, PictureRecord, StorageKind, StorageRecord};
use crate::planner::BackupPlanner;

/// Terminal state of one discovered file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Not an image; contributes to no counts
    SkippedNotImage,

    /// Copied to the archive volume and recorded
    RecordedNewStorage,

    /// Already present at its canonical backup path; nothing copied
    RecordedDuplicate,

    /// A per-item error; counted, logged, and the run continued
    Failed,
}

/// Aggregate result of one archival run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Images seen (non-images are not counted)
    pub images: usize,

    /// Images already present at their canonical backup path
    pub duplicates: usize,

    /// Per-item failures
    pub errors: usize,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl RunReport {
    /// Images newly copied into the archive
    pub fn success(&self) -> usize {
        self.images
            .saturating_sub(self.duplicates)
            .saturating_sub(self.errors)
    }

    fn tally(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::RecordedDuplicate => self.duplicates += 1,
            Outcome::Failed => self.errors += 1,
            Outcome::SkippedNotImage | Outcome::RecordedNewStorage => {}
        }
    }
}

/// Orchestrates the content-addressed backup of a directory tree or a
/// single file.
pub struct ArchiveEngine<M: MetadataExtractor = FileMetadataExtractor> {
    config: Config,
    planner: BackupPlanner,
    extractor: M,
    hostname: String,
}

impl ArchiveEngine<FileMetadataExtractor> {
    /// Create an engine with the default metadata extractor
    pub fn new(config: Config) -> Self {
        Self::with_extractor(config, FileMetadataExtractor)
    }
}

impl<M: MetadataExtractor> ArchiveEngine<M> {
    /// Create an engine with a custom metadata extractor
    pub fn with_extractor(config: Config, extractor: M) -> Self {
        let planner = BackupPlanner::new(&config.archive_root);
        let hostname = config.effective_hostname();
        Self {
            config,
            planner,
            extractor,
            hostname,
        }
    }

    /// Run the engine over `path`, which may be a directory or a single
    /// file (the degenerate single-item case of the same algorithm).
    ///
    /// Per-item errors are counted and the run continues; structural
    /// errors, and per-item errors beyond the configured budget, abort
    /// with the offending error. The repository is committed every
    /// `commit_interval` items and unconditionally before returning.
    pub fn run<R: ArchiveRepository>(&self, repo: &mut R, path: &Path) -> Result<RunReport> {
        let start = Instant::now();
        let mut report = RunReport::default();

        match Node::classify(path) {
            Node::File(file) => {
                self.run_item(repo, &file, &mut report)?;
            }
            Node::Directory(dir) => {
                self.run_tree(repo, &dir, &mut report)?;
            }
            Node::Unreadable(path) => return Err(Error::NotADirectory(path)),
        }

        repo.commit()?;
        report.elapsed = start.elapsed();

        info!(
            "archived {} of {} images ({} duplicates, {} errors) in {:.3}s",
            report.success(),
            report.images,
            report.duplicates,
            report.errors,
            report.elapsed.as_secs_f64()
        );
        Ok(report)
    }

    /// Walk a directory tree, processing each discovered file
    fn run_tree<R: ArchiveRepository>(
        &self,
        repo: &mut R,
        root: &Path,
        report: &mut RunReport,
    ) -> Result<()> {
        let walker = DirectoryWalker::new(root, self.config.recursive, self.config.max_depth)?;
        let mut processed = 0usize;
        let mut last_error: Option<Error> = None;

        for node in walker.walk() {
            let file = match node {
                Node::File(file) => file,
                Node::Directory(_) => continue,
                Node::Unreadable(path) => {
                    warn!("skipping unreadable path {}", path.display());
                    continue;
                }
            };

            if let Some(error) = self.process_node(repo, &file, report)? {
                last_error = Some(error);
            }

            processed += 1;
            if processed % self.config.commit_interval == 0 {
                repo.commit()?;
                debug!("committed after {} items", processed);
            }

            if let Some(budget) = self.config.error_budget {
                if report.errors > budget {
                    warn!("error budget of {} exceeded, aborting run", budget);
                    // Completed items are whole units; keep them
                    repo.commit()?;
                    return Err(last_error
                        .unwrap_or_else(|| Error::Configuration("error budget exceeded".into())));
                }
            }
        }

        Ok(())
    }

    /// Process a single already-classified file
    fn run_item<R: ArchiveRepository>(
        &self,
        repo: &mut R,
        file: &Path,
        report: &mut RunReport,
    ) -> Result<()> {
        self.process_node(repo, file, report)?;
        Ok(())
    }

    /// Step a file through the state machine, updating the tally.
    ///
    /// Returns the error for a Failed item so the caller can track the
    /// most recent one; structural errors propagate instead.
    fn process_node<R: ArchiveRepository>(
        &self,
        repo: &mut R,
        file: &Path,
        report: &mut RunReport,
    ) -> Result<Option<Error>> {
        if !is_image(file) {
            debug!("skipping non-image {}", file.display());
            report.tally(Outcome::SkippedNotImage);
            return Ok(None);
        }

        report.images += 1;
        match self.archive_image(repo, file) {
            Ok(outcome) => {
                report.tally(outcome);
                Ok(None)
            }
            Err(error) if error.is_per_item() => {
                report.tally(Outcome::Failed);
                log_item_error(file, &error);
                Ok(Some(error))
            }
            Err(error) => Err(error),
        }
    }

    /// Steps 2-6 of the per-file state machine: fingerprint, look up or
    /// create the picture, record the original location, and copy to the
    /// canonical backup path unless already archived.
    pub fn archive_image<R: ArchiveRepository>(
        &self,
        repo: &mut R,
        source: &Path,
    ) -> Result<Outcome> {
        let fp = fingerprint(source)?;

        let picture = match repo.find_picture_by_fingerprint(&fp)? {
            Some(existing) => existing,
            None => {
                let metadata = self.extractor.extract(source)?;
                let bytes = fs::metadata(source)?.len();
                repo.upsert_picture(&PictureRecord::new(fp.clone(), &metadata, bytes))?
            }
        };

        // The same logical photo may legitimately live at several source
        // paths; each one gets its own original-storage row.
        repo.upsert_storage(&StorageRecord::new(
            StorageKind::Original,
            &self.hostname,
            source.to_path_buf(),
            fp.clone(),
        ))?;

        let picture_id = picture
            .id
            .ok_or_else(|| Error::PictureNotFoundForStorage(fp.to_string()))?;
        let destination =
            self.planner
                .absolute_path(picture.date_taken, picture_id, &picture.mimetype);

        if destination.exists() {
            debug!(
                "{} already archived at {}",
                source.display(),
                destination.display()
            );
            return Ok(Outcome::RecordedDuplicate);
        }

        self.copy_preserving(source, &destination)?;
        repo.upsert_storage(&StorageRecord::new(
            StorageKind::ArchiveVolume,
            &self.hostname,
            destination,
            fp,
        ))?;

        Ok(Outcome::RecordedNewStorage)
    }

    /// Copy `source` to `destination`, creating intermediate directories
    /// and carrying over permissions and the modification time.
    fn copy_preserving(&self, source: &Path, destination: &Path) -> Result<()> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source, destination)?;

        let meta = fs::metadata(source)?;
        filetime::set_file_mtime(destination, FileTime::from_last_modification_time(&meta))?;

        log_fs_modification("copy", destination);
        Ok(())
    }
}
