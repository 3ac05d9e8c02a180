//! Command-line interface for ranking images by pairwise comparison.
//!
//! `pairwise rank` runs an interactive session on the terminal, `pairwise top`
//! prints the current ranking and `pairwise reconcile` rewrites the score file
//! against the images that exist today.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use pairwise_core::ItemCatalog;
use pairwise_store::{DirectoryCatalog, LoadedTable, ParseMode, ScoreFile};

mod error;
mod output;
mod rank;
mod top;

pub use error::CliError;

use rank::RankArgs;
use top::{ReconcileArgs, TopArgs};

pub(crate) const ARG_IMAGES_DIR: &str = "images-dir";
pub(crate) const ARG_SCORES: &str = "scores";
pub(crate) const ARG_PARSE_MODE: &str = "parse-mode";
pub(crate) const ARG_K_FACTOR: &str = "k-factor";
pub(crate) const ARG_AVOID_REPEATS: &str = "avoid-repeats";
pub(crate) const ARG_AUTOSAVE_EVERY: &str = "autosave-every";
pub(crate) const ARG_SEED: &str = "seed";
pub(crate) const ARG_LIMIT: &str = "limit";
pub(crate) const ENV_K_FACTOR: &str = "PAIRWISE_CMDS_RANK_K_FACTOR";

pub(crate) const DEFAULT_IMAGES_DIR: &str = "images";
pub(crate) const DEFAULT_SCORES: &str = "rankings.txt";

/// Run the pairwise CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments or configuration are invalid, when the
/// image directory or score file cannot be used, or when terminal I/O fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Rank(args) => rank::run_rank(args),
        Command::Top(args) => top::run_top(args),
        Command::Reconcile(args) => top::run_reconcile(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "pairwise",
    about = "Rank images by repeatedly choosing the better of two",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compare pairs of images interactively and update their scores.
    Rank(RankArgs),
    /// Print the highest-rated images.
    Top(TopArgs),
    /// Align the score file with the images currently on disk.
    Reconcile(ReconcileArgs),
}

/// Where the images and their scores live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Library {
    pub(crate) images_dir: Utf8PathBuf,
    pub(crate) scores: Utf8PathBuf,
    pub(crate) parse_mode: ParseMode,
}

impl Default for Library {
    fn default() -> Self {
        Self::resolve(None, None, None)
    }
}

impl Library {
    pub(crate) fn resolve(
        images_dir: Option<Utf8PathBuf>,
        scores: Option<Utf8PathBuf>,
        parse_mode: Option<ParseMode>,
    ) -> Self {
        Self {
            images_dir: images_dir.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_IMAGES_DIR)),
            scores: scores.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_SCORES)),
            parse_mode: parse_mode.unwrap_or_default(),
        }
    }

    pub(crate) fn store(&self) -> ScoreFile {
        ScoreFile::new(self.scores.clone()).with_mode(self.parse_mode)
    }

    /// Scan the images and load their reconciled scores.
    pub(crate) fn load(&self, default_score: f64) -> Result<(ScoreFile, LoadedTable), CliError> {
        let catalog = DirectoryCatalog::new(self.images_dir.clone()).list_items()?;
        let store = self.store();
        let loaded = store.load(&catalog, default_score)?;
        Ok((store, loaded))
    }

    pub(crate) fn scores(&self) -> &Utf8Path {
        &self.scores
    }
}

#[cfg(test)]
mod tests;
