//! Facade crate for pairwise image ranking.
//!
//! This crate re-exports the core domain types and exposes the file-backed
//! catalog and score store behind the `store-file` feature.

#![forbid(unsafe_code)]

pub use pairwise_core::{
    Catalog, Choice, ComparisonPair, DEFAULT_K_FACTOR, DEFAULT_SCORE, Decision, EloConfig,
    InvalidDecision, Item, ItemCatalog, RatingChange, RatingSink, RatingTable, ReconcileReport,
    Session, SessionConfig, SessionError, SessionState, apply_decision, expected_score, next_pair,
};

#[cfg(feature = "test-support")]
pub use pairwise_core::test_support;

#[cfg(feature = "store-file")]
pub use pairwise_store::{
    CatalogError, DirectoryCatalog, LoadReport, LoadedTable, ParseMode, ScoreFile, StoreError,
};
