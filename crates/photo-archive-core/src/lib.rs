//! Core functionality for content-addressed photo archival.
//!
//! This library provides the foundational components for archiving a
//! directory tree of photographs:
//! - Path classification and deterministic directory traversal
//! - Streaming content fingerprints used as the deduplication key
//! - Canonical, date-derived backup path planning
//! - Picture/storage record persistence behind a repository seam
//! - The archival engine orchestrating the above

// -- Internal Modules --
mod error;

// -- Public Re-exports --
pub use config::Config;
pub use engine::{ArchiveEngine, Outcome, RunReport};
pub use error::{Error, Result};
pub use fingerprint::{fingerprint, Fingerprint};

// -- Public Modules --
pub mod config;
pub mod discovery;
pub mod engine;
pub mod fingerprint;
pub mod logging;
pub mod metadata;
pub mod persistence;
pub mod planner;
