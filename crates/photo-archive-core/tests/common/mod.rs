//! Shared fixtures for the engine integration tests.

use std::path::{Path, PathBuf};

use photo_archive_core::Config;
use tempfile::TempDir;

/// A temporary source tree plus archive root and database location
pub struct Fixture {
    pub dir: TempDir,
    pub source: PathBuf,
    pub archive_root: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("source");
        let archive_root = dir.path().join("archive");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::create_dir_all(&archive_root).unwrap();
        Self {
            dir,
            source,
            archive_root,
        }
    }

    /// Engine configuration pointing at the fixture's archive root
    pub fn config(&self) -> Config {
        Config {
            archive_root: self.archive_root.clone(),
            database_path: self.dir.path().join("archive.db"),
            hostname: Some("testhost".to_string()),
            recursive: true,
            ..Config::default()
        }
    }

    /// Number of files (not directories) under the archive root
    pub fn archived_file_count(&self) -> usize {
        count_files(&self.archive_root)
    }
}

fn count_files(dir: &Path) -> usize {
    let mut count = 0;
    for entry in std::fs::read_dir(dir).unwrap() {
        let entry = entry.unwrap();
        if entry.file_type().unwrap().is_dir() {
            count += count_files(&entry.path());
        } else {
            count += 1;
        }
    }
    count
}

/// Write a real decodable image; distinct `seed`s give distinct bytes
pub fn create_image(dir: &Path, name: &str, seed: u8) -> PathBuf {
    let path = dir.join(name);
    let img = image::RgbImage::from_pixel(8, 8, image::Rgb([seed, seed.wrapping_add(40), 200]));
    img.save(&path).unwrap();
    path
}

/// Write a file with an image extension but undecodable contents
pub fn create_corrupt_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"this is not a valid image payload").unwrap();
    path
}

/// Write a plain text file
pub fn create_text_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"just some notes").unwrap();
    path
}
