//! Error types raised while scanning items and persisting scores.

use camino::Utf8PathBuf;
use pairwise_core::Item;
use thiserror::Error;

/// Errors raised while listing the items in an image directory.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The directory could not be opened.
    #[error("failed to open image directory {path}")]
    OpenDirectory {
        /// Requested directory path.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// Iterating the directory entries failed.
    #[error("failed to read entries of image directory {path}")]
    ReadDirectory {
        /// Directory being scanned.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
}

/// Reasons a single score file line is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    /// The line has no `:` between key and score.
    #[error("missing ':' separator")]
    MissingSeparator,
    /// The text before the separator is empty.
    #[error("empty item key")]
    EmptyKey,
    /// The item key holds a line break and cannot sit on one line.
    #[error("item key contains a line break")]
    LineBreakInKey,
    /// The line is not valid UTF-8.
    #[error("line is not valid UTF-8")]
    InvalidUtf8 {
        /// Source error from UTF-8 decoding.
        #[source]
        source: std::str::Utf8Error,
    },
    /// The text after the separator is not a number.
    #[error("score {raw:?} is not a number")]
    InvalidScore {
        /// Score text as found in the file.
        raw: String,
        /// Source error from float parsing.
        #[source]
        source: std::num::ParseFloatError,
    },
    /// The score parsed to infinity or NaN.
    #[error("score {raw:?} is not finite")]
    NonFiniteScore {
        /// Score text as found in the file.
        raw: String,
    },
}

/// An item whose key cannot be written as a score file line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("item {item:?} cannot be stored")]
pub struct UnstorableKey {
    /// The offending item.
    pub item: Item,
    /// Why the key cannot be written.
    #[source]
    pub reason: LineError,
}

/// Errors raised while loading or saving a score file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading the score file failed.
    #[error("failed to read score file {path}")]
    Read {
        /// Score file path.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// A line could not be parsed while loading in strict mode.
    #[error("malformed score file {path} at line {line}")]
    Parse {
        /// Score file path.
        path: Utf8PathBuf,
        /// One-based line number.
        line: usize,
        /// Why the line was rejected.
        #[source]
        source: LineError,
    },
    /// The table holds an item whose key cannot be written. Nothing was saved.
    #[error("cannot save score file {path}")]
    Unstorable {
        /// Score file path.
        path: Utf8PathBuf,
        /// The rejected key.
        #[source]
        source: UnstorableKey,
    },
    /// Creating the parent directory for the score file failed.
    #[error("failed to create parent directory {path}")]
    CreateParent {
        /// Path of the directory that could not be created.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
    /// Writing or renaming the new snapshot failed. The previous file is intact.
    #[error("failed to write score file {path}")]
    Persist {
        /// Score file path.
        path: Utf8PathBuf,
        /// Source error from std I/O.
        #[source]
        source: std::io::Error,
    },
}
