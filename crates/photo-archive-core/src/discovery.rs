use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

use crate::error::{Error, Result};

/// Returns a normalized, absolute version of the given path.
///
/// Does not require the path to exist; relative paths are resolved against
/// the current working directory and `.`/`..` components are collapsed
/// lexically.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// A classified filesystem path.
///
/// Classification happens once, at discovery time; a node is never
/// reclassified in place. A path whose metadata cannot be read is
/// `Unreadable` rather than an error, so a walk over a partially
/// permissioned tree still completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    File(PathBuf),
    Directory(PathBuf),
    Unreadable(PathBuf),
}

impl Node {
    /// Classify a path by what is on disk right now
    pub fn classify(path: &Path) -> Node {
        let path = normalize_path(path);
        match fs::metadata(&path) {
            Ok(meta) if meta.is_dir() => Node::Directory(path),
            Ok(meta) if meta.is_file() => Node::File(path),
            _ => Node::Unreadable(path),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Node::File(p) | Node::Directory(p) | Node::Unreadable(p) => p,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Node::File(_))
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Directory(_))
    }
}

/// Returns the guessed mimetype of a path from its extension
pub fn mimetype_of(path: &Path) -> Option<&'static str> {
    mime_guess::from_path(path).first_raw()
}

/// Returns whether the given path looks like an image
pub fn is_image(path: &Path) -> bool {
    mimetype_of(path).is_some_and(|m| m.starts_with("image/"))
}

/// Walks a directory tree to a bounded or unbounded depth.
///
/// Construction fails if the root is not a directory; each call to
/// [`walk`](DirectoryWalker::walk) re-traverses from current disk state.
#[derive(Debug, Clone)]
pub struct DirectoryWalker {
    root: PathBuf,
    max_depth: usize,
}

impl DirectoryWalker {
    /// Create a walker over `root`.
    ///
    /// When `recursive` is false and no depth is given, depth is clamped
    /// to 0 and only the root's immediate children are yielded.
    pub fn new(root: &Path, recursive: bool, max_depth: Option<usize>) -> Result<Self> {
        let root = normalize_path(root);
        if !root.is_dir() {
            return Err(Error::NotADirectory(root));
        }

        let max_depth = match max_depth {
            Some(depth) => depth,
            None if recursive => usize::MAX,
            None => 0,
        };

        Ok(Self { root, max_depth })
    }

    /// Lazily yield classified nodes, one directory level at a time.
    ///
    /// All entries of a directory are yielded (subdirectories first, then
    /// files, name-sorted) before any descent. Once a directory sits at
    /// the maximum depth its entries are still yielded but its
    /// subdirectories are not entered.
    pub fn walk(&self) -> Walk {
        let mut queue = VecDeque::new();
        queue.push_back((self.root.clone(), 0));
        Walk {
            queue,
            pending: VecDeque::new(),
            max_depth: self.max_depth,
        }
    }
}

/// Lazy iterator over the nodes of a [`DirectoryWalker`]
pub struct Walk {
    queue: VecDeque<(PathBuf, usize)>,
    pending: VecDeque<Node>,
    max_depth: usize,
}

impl Walk {
    /// List one directory, queueing its subdirectories for later descent
    fn list_level(&mut self, dir: &Path, depth: usize) {
        // The directory was already yielded when its parent level was
        // listed; a failed listing is logged, not yielded again.
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("could not list {}: {}", dir.display(), e);
                return;
            }
        };

        let mut dirs = Vec::new();
        let mut files = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("unreadable entry under {}: {}", dir.display(), e);
                    continue;
                }
            };
            match Node::classify(&entry.path()) {
                node @ Node::Directory(_) => dirs.push(node),
                node => files.push(node),
            }
        }

        // Listing order from the OS is arbitrary; sort for determinism
        dirs.sort_by(|a, b| a.path().cmp(b.path()));
        files.sort_by(|a, b| a.path().cmp(b.path()));

        for node in dirs {
            if depth < self.max_depth {
                self.queue.push_back((node.path().to_path_buf(), depth + 1));
            }
            self.pending.push_back(node);
        }
        self.pending.extend(files);
    }
}

impl Iterator for Walk {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        loop {
            if let Some(node) = self.pending.pop_front() {
                return Some(node);
            }
            let (dir, depth) = self.queue.pop_front()?;
            self.list_level(&dir, depth);
        }
    }
}

// -- Tests --
