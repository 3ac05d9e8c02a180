//! Error types emitted by the pairwise CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use pairwise_core::SessionError;
use pairwise_store::{CatalogError, StoreError};
use thiserror::Error;

/// Errors emitted by the pairwise CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// An option was supplied but holds an unusable value.
    #[error("invalid {field}: {reason} (set --{field} or {env})")]
    InvalidArgument {
        field: &'static str,
        env: &'static str,
        reason: String,
    },
    /// Listing the image directory failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// Loading or saving the score file failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The comparison session rejected an operation.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// Serializing the ranking failed.
    #[error("failed to serialize ranking: {0}")]
    SerializeRanking(#[source] serde_json::Error),
    /// Reading input or writing output on the terminal failed.
    #[error("terminal I/O failed: {0}")]
    Terminal(#[source] std::io::Error),
}
