//! Rank command: the interactive comparison loop.

use std::io::{BufRead, Write};

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use pairwise_core::{
    Choice, ComparisonPair, DEFAULT_K_FACTOR, EloConfig, RatingSink, RatingTable, Session,
    SessionConfig, SessionError,
};
use pairwise_store::ParseMode;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::output::write_scores;
use crate::{
    ARG_AUTOSAVE_EVERY, ARG_AVOID_REPEATS, ARG_IMAGES_DIR, ARG_K_FACTOR, ARG_PARSE_MODE,
    ARG_SCORES, ARG_SEED, CliError, ENV_K_FACTOR, Library,
};

const DEFAULT_AVOID_REPEATS: usize = 1;
const HELP: &str = "choose with a/1 (first) or d/2 (second); s skips, w saves, e or q ends";

/// CLI arguments for the `rank` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Show pairs of images by name and record which one you prefer. \
                 Scores are loaded from the score file, updated with the Elo \
                 rule after every choice, and saved when the session ends.",
    about = "Compare pairs of images interactively"
)]
#[ortho_config(prefix = "PAIRWISE")]
pub(crate) struct RankArgs {
    /// Directory holding the images to rank.
    #[arg(long = ARG_IMAGES_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) images_dir: Option<Utf8PathBuf>,
    /// Score file to load and save.
    #[arg(long = ARG_SCORES, value_name = "path")]
    #[serde(default)]
    pub(crate) scores: Option<Utf8PathBuf>,
    /// How to treat malformed score lines: "lenient" or "strict".
    #[arg(long = ARG_PARSE_MODE, value_name = "mode")]
    #[serde(default)]
    pub(crate) parse_mode: Option<ParseMode>,
    /// Maximum score change per comparison.
    #[arg(long = ARG_K_FACTOR, value_name = "k")]
    #[serde(default)]
    pub(crate) k_factor: Option<f64>,
    /// Number of recent pairs to avoid showing again.
    #[arg(long = ARG_AVOID_REPEATS, value_name = "n")]
    #[serde(default)]
    pub(crate) avoid_repeats: Option<usize>,
    /// Save after every n choices; 0 saves only at the end.
    #[arg(long = ARG_AUTOSAVE_EVERY, value_name = "n")]
    #[serde(default)]
    pub(crate) autosave_every: Option<usize>,
    /// Seed for reproducible pair selection.
    #[arg(long = ARG_SEED, value_name = "n")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
}

impl RankArgs {
    pub(crate) fn into_config(self) -> Result<RankConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RankConfig::try_from(merged)
    }
}

/// Resolved `rank` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RankConfig {
    pub(crate) library: Library,
    pub(crate) session: SessionConfig,
    pub(crate) autosave_every: usize,
    pub(crate) seed: Option<u64>,
}

impl TryFrom<RankArgs> for RankConfig {
    type Error = CliError;

    fn try_from(args: RankArgs) -> Result<Self, Self::Error> {
        let k_factor = args.k_factor.unwrap_or(DEFAULT_K_FACTOR);
        if !k_factor.is_finite() || k_factor <= 0.0 {
            return Err(CliError::InvalidArgument {
                field: ARG_K_FACTOR,
                env: ENV_K_FACTOR,
                reason: format!("{k_factor} is not a positive number"),
            });
        }
        Ok(Self {
            library: Library::resolve(args.images_dir, args.scores, args.parse_mode),
            session: SessionConfig {
                elo: EloConfig {
                    k_factor,
                    ..EloConfig::default()
                },
                recent_window: args.avoid_repeats.unwrap_or(DEFAULT_AVOID_REPEATS),
            },
            autosave_every: args.autosave_every.unwrap_or(0),
            seed: args.seed,
        })
    }
}

/// What a finished rank session produced.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RankOutcome {
    pub(crate) decisions: usize,
    pub(crate) table: RatingTable,
}

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Input {
    Vote(Choice),
    Skip,
    Save,
    End,
}

impl Input {
    pub(crate) fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "a" | "1" => Some(Self::Vote(Choice::First)),
            "d" | "2" => Some(Self::Vote(Choice::Second)),
            "s" => Some(Self::Skip),
            "w" => Some(Self::Save),
            "e" | "q" => Some(Self::End),
            _ => None,
        }
    }
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    let mut input = std::io::stdin().lock();
    let mut output = std::io::stdout().lock();
    run_rank_with(&config, &mut input, &mut output).map(|_| ())
}

/// Load the library, drive a session from `input`, and save the result.
pub(crate) fn run_rank_with(
    config: &RankConfig,
    input: &mut dyn BufRead,
    output: &mut dyn Write,
) -> Result<RankOutcome, CliError> {
    let (store, loaded) = config.library.load(config.session.elo.default_score)?;
    let rng = config
        .seed
        .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let mut session = Session::new(loaded.table, config.session, rng);
    writeln!(output, "{HELP}").map_err(CliError::Terminal)?;

    drive_session(&mut session, &store, config.autosave_every, input, output)?;

    session.finish(&store)?;
    writeln!(
        output,
        "saved {} scores to {} after {} choices",
        session.table().len(),
        config.library.scores(),
        session.decisions()
    )
    .map_err(CliError::Terminal)?;
    write_scores(output, &session.table().ranked())?;
    Ok(RankOutcome {
        decisions: session.decisions(),
        table: session.into_table(),
    })
}

/// Prompt for pairs until the user ends the session or input runs out.
pub(crate) fn drive_session<R, S>(
    session: &mut Session<R>,
    sink: &S,
    autosave_every: usize,
    input: &mut dyn BufRead,
    output: &mut dyn Write,
) -> Result<(), CliError>
where
    R: rand::Rng,
    S: RatingSink,
{
    loop {
        let pair = match session.next_pair() {
            Ok(pair) => pair.clone(),
            Err(SessionError::NotEnoughItems { available }) => {
                writeln!(output, "need at least two images to compare, found {available}")
                    .map_err(CliError::Terminal)?;
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        prompt(output, &pair)?;

        let mut line = String::new();
        if input.read_line(&mut line).map_err(CliError::Terminal)? == 0 {
            writeln!(output).map_err(CliError::Terminal)?;
            return Ok(());
        }
        match Input::parse(&line) {
            Some(Input::Vote(choice)) => match session.decide(choice) {
                Ok(change) => {
                    log::debug!(
                        "{} beat {}: {:.2} -> {:.2}, {:.2} -> {:.2}",
                        change.winner,
                        change.loser,
                        change.winner_before,
                        change.winner_after,
                        change.loser_before,
                        change.loser_after
                    );
                    if autosave_every > 0 && session.decisions().is_multiple_of(autosave_every) {
                        checkpoint(session, sink, output)?;
                    }
                }
                Err(err) => writeln!(output, "{err}").map_err(CliError::Terminal)?,
            },
            Some(Input::Skip) => {
                session.skip()?;
            }
            Some(Input::Save) => {
                checkpoint(session, sink, output)?;
            }
            Some(Input::End) => return Ok(()),
            None => writeln!(output, "unrecognised input {:?}; {HELP}", line.trim())
                .map_err(CliError::Terminal)?,
        }
    }
}

fn prompt(output: &mut dyn Write, pair: &ComparisonPair) -> Result<(), CliError> {
    write!(output, "[a] {}  vs  [d] {} > ", pair.first(), pair.second())
        .and_then(|()| output.flush())
        .map_err(CliError::Terminal)
}

/// Save without ending; a failed save is reported and the session goes on.
fn checkpoint<R, S>(session: &Session<R>, sink: &S, output: &mut dyn Write) -> Result<(), CliError>
where
    R: rand::Rng,
    S: RatingSink,
{
    let written = match session.checkpoint(sink) {
        Ok(()) => writeln!(output, "saved after {} choices", session.decisions()),
        Err(err) => {
            log::error!("checkpoint failed: {err}");
            writeln!(output, "save failed: {err}")
        }
    };
    written.map_err(CliError::Terminal)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<RankConfig, CliError> {
    let merged = RankArgs::merge_from_layers(layers).map_err(CliError::from)?;
    RankConfig::try_from(merged)
}
