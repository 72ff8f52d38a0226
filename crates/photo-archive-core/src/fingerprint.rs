//! Streaming content fingerprints used as the deduplication key.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

// SHA-256 internal block size (64 bytes) x 256, to amortize I/O
const CHUNK_SIZE: usize = 64 * 256;

/// Base64-rendered SHA-256 digest of a file's contents.
///
/// Two byte-identical files yield the same fingerprint regardless of
/// path, name or filesystem metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wrap an already-rendered digest, e.g. one read back from the database
    pub fn from_string(value: String) -> Self {
        Fingerprint(value)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the fingerprint of a file by streaming its bytes through SHA-256.
///
/// Fails with [`Error::NotAFile`] if the path is not a regular file at read
/// time; a file listed by the walker may have vanished or been replaced by
/// a directory in the meantime.
pub fn fingerprint<P: AsRef<Path>>(path: P) -> Result<Fingerprint> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::NotAFile(path.to_path_buf()));
    }

    let digest = {
        let mut file = File::open(path)?;
        let mut hasher = Sha256::new();

        let mut buffer = [0u8; CHUNK_SIZE];
        loop {
            let bytes_read = file.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        hasher.finalize()
    };

    Ok(Fingerprint(BASE64.encode(digest)))
}

// -- Tests --

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_identical_bytes_identical_fingerprint() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("subdir renamed b.jpeg");
        std::fs::write(&a, b"the same bytes").unwrap();
        std::fs::write(&b, b"the same bytes").unwrap();

        assert_eq!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn test_different_bytes_different_fingerprint() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");
        std::fs::write(&a, b"some bytes").unwrap();
        std::fs::write(&b, b"other bytes").unwrap();

        assert_ne!(fingerprint(&a).unwrap(), fingerprint(&b).unwrap());
    }

    #[test]
    fn test_known_digest() {
        // sha256("") = 47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU= in base64
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty");
        File::create(&empty).unwrap();

        assert_eq!(
            fingerprint(&empty).unwrap().as_str(),
            "47DEQpj8HBSa+/TImW+5JCeuQeRkm5NMpJWZG3hSuFU="
        );
    }

    #[test]
    fn test_streaming_matches_single_shot() {
        // File larger than one chunk exercises the read loop
        let dir = tempdir().unwrap();
        let big = dir.path().join("big.bin");
        let mut file = File::create(&big).unwrap();
        let block = [0xABu8; 1024];
        for _ in 0..48 {
            file.write_all(&block).unwrap();
        }
        drop(file);

        let expected = BASE64.encode(Sha256::digest(std::fs::read(&big).unwrap()));
        assert_eq!(fingerprint(&big).unwrap().as_str(), expected);
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            fingerprint(dir.path()),
            Err(Error::NotAFile(_))
        ));
    }

    #[test]
    fn test_missing_path_is_not_a_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            fingerprint(dir.path().join("gone.jpg")),
            Err(Error::NotAFile(_))
        ));
    }
}
