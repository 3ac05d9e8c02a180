//! Filesystem collaborators for pairwise ranking.
//!
//! The crate provides the two pieces of state that live on disk:
//! - **Item catalog**: [`DirectoryCatalog`] lists the image files in one
//!   directory and implements [`ItemCatalog`](pairwise_core::ItemCatalog).
//! - **Rating store**: [`ScoreFile`] loads a text score file, reconciles it
//!   against the current catalog and saves it back atomically. It implements
//!   [`RatingSink`](pairwise_core::RatingSink) so a
//!   [`Session`](pairwise_core::Session) can persist itself.
//!
//! # Examples
//!
//! ```no_run
//! use pairwise_core::{DEFAULT_SCORE, ItemCatalog};
//! use pairwise_store::{DirectoryCatalog, ScoreFile};
//!
//! let catalog = DirectoryCatalog::new("images").list_items().expect("scan images");
//! let store = ScoreFile::new("rankings.txt");
//! let loaded = store.load(&catalog, DEFAULT_SCORE).expect("load scores");
//! for (item, score) in loaded.table.top_n(3) {
//!     println!("{item}: {score}");
//! }
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod catalog;
mod error;
mod score_file;

pub use catalog::{DirectoryCatalog, IMAGE_EXTENSIONS};
pub use error::{CatalogError, LineError, StoreError, UnstorableKey};
pub use score_file::{
    LoadReport, LoadedTable, MalformedLine, ParseMode, ParsedScores, ScoreFile, UnknownParseMode,
    check_key, parse_scores, render_scores,
};

#[cfg(test)]
mod tests;
