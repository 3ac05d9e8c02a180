//! Read-only ranking report and score file reconciliation.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use pairwise_core::{DEFAULT_SCORE, ReconcileReport};
use pairwise_store::ParseMode;
use serde::{Deserialize, Serialize};

use crate::output::{write_json, write_table};
use crate::{ARG_IMAGES_DIR, ARG_LIMIT, ARG_PARSE_MODE, ARG_SCORES, CliError, Library};

const DEFAULT_LIMIT: usize = 10;

/// CLI arguments for the `top` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load the score file, align it with the images on disk and \
                 print the best-rated images. Nothing is written.",
    about = "Print the highest-rated images"
)]
#[ortho_config(prefix = "PAIRWISE")]
pub(crate) struct TopArgs {
    /// Directory holding the ranked images.
    #[arg(long = ARG_IMAGES_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) images_dir: Option<Utf8PathBuf>,
    /// Score file to read.
    #[arg(long = ARG_SCORES, value_name = "path")]
    #[serde(default)]
    pub(crate) scores: Option<Utf8PathBuf>,
    /// How to treat malformed score lines: "lenient" or "strict".
    #[arg(long = ARG_PARSE_MODE, value_name = "mode")]
    #[serde(default)]
    pub(crate) parse_mode: Option<ParseMode>,
    /// Number of images to print.
    #[arg(long = ARG_LIMIT, value_name = "n")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Print JSON instead of a table.
    #[arg(long)]
    #[serde(default)]
    pub(crate) json: bool,
}

impl TopArgs {
    pub(crate) fn into_config(self) -> Result<TopConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(TopConfig::from(merged))
    }
}

/// Resolved `top` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TopConfig {
    pub(crate) library: Library,
    pub(crate) limit: usize,
    pub(crate) json: bool,
}

impl From<TopArgs> for TopConfig {
    fn from(args: TopArgs) -> Self {
        Self {
            library: Library::resolve(args.images_dir, args.scores, args.parse_mode),
            limit: args.limit.unwrap_or(DEFAULT_LIMIT),
            json: args.json,
        }
    }
}

/// CLI arguments for the `reconcile` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Rewrite the score file so it lists exactly the images on \
                 disk: new images start at the default score and entries for \
                 removed images are dropped.",
    about = "Align the score file with the images on disk"
)]
#[ortho_config(prefix = "PAIRWISE")]
pub(crate) struct ReconcileArgs {
    /// Directory holding the ranked images.
    #[arg(long = ARG_IMAGES_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) images_dir: Option<Utf8PathBuf>,
    /// Score file to rewrite.
    #[arg(long = ARG_SCORES, value_name = "path")]
    #[serde(default)]
    pub(crate) scores: Option<Utf8PathBuf>,
    /// How to treat malformed score lines: "lenient" or "strict".
    #[arg(long = ARG_PARSE_MODE, value_name = "mode")]
    #[serde(default)]
    pub(crate) parse_mode: Option<ParseMode>,
}

impl ReconcileArgs {
    pub(crate) fn into_library(self) -> Result<Library, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(Library::resolve(
            merged.images_dir,
            merged.scores,
            merged.parse_mode,
        ))
    }
}

pub(crate) fn run_top(args: TopArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    let mut stdout = std::io::stdout().lock();
    run_top_with(&config, &mut stdout)
}

pub(crate) fn run_top_with(config: &TopConfig, writer: &mut dyn Write) -> Result<(), CliError> {
    let (_, loaded) = config.library.load(DEFAULT_SCORE)?;
    let entries = loaded.table.top_n(config.limit);
    if config.json {
        write_json(writer, &entries, loaded.table.len())
    } else {
        write_table(writer, &entries, loaded.table.len())
    }
}

pub(crate) fn run_reconcile(args: ReconcileArgs) -> Result<(), CliError> {
    let library = args.into_library()?;
    let mut stdout = std::io::stdout().lock();
    run_reconcile_with(&library, &mut stdout).map(|_| ())
}

/// Load, reconcile and rewrite the score file.
pub(crate) fn run_reconcile_with(
    library: &Library,
    writer: &mut dyn Write,
) -> Result<ReconcileReport, CliError> {
    let (store, loaded) = library.load(DEFAULT_SCORE)?;
    store.save(&loaded.table)?;
    let report = loaded.report.reconcile;
    writeln!(
        writer,
        "{}: kept {}, added {}, removed {}",
        library.scores(),
        report.restored,
        report.created,
        report.pruned
    )
    .map_err(CliError::Terminal)?;
    if !loaded.report.skipped.is_empty() {
        writeln!(
            writer,
            "dropped {} malformed line(s)",
            loaded.report.skipped.len()
        )
        .map_err(CliError::Terminal)?;
    }
    Ok(report)
}
