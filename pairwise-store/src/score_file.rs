//! Plain-text score file: one `item:score` line per rated item.
//!
//! Loading always reconciles against the current catalog, so the returned
//! table holds exactly the catalog's items. Saving writes every entry ranked
//! best-first and replaces the previous file atomically.

use std::fmt;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use pairwise_core::{Catalog, Item, RatingSink, RatingTable, ReconcileReport};
use pairwise_fs::{ensure_parent_dir, read_if_exists, write_atomically};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{LineError, StoreError, UnstorableKey};

/// How malformed lines are treated while loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Skip malformed lines with a warning.
    #[default]
    Lenient,
    /// Abort the load on the first malformed line.
    Strict,
}

impl ParseMode {
    /// Lower-case name as accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a parse mode name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown parse mode {0:?}; expected \"lenient\" or \"strict\"")]
pub struct UnknownParseMode(pub String);

impl FromStr for ParseMode {
    type Err = UnknownParseMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            _ => Err(UnknownParseMode(s.to_owned())),
        }
    }
}

/// A score file line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// One-based line number.
    pub line: usize,
    /// Line text without its terminator. Invalid UTF-8 is replaced.
    pub text: String,
    /// Why the line was rejected.
    pub reason: LineError,
}

/// Entries read from a score file before reconciliation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedScores {
    /// Parsed entries in file order. Later duplicates override earlier ones.
    pub entries: Vec<(Item, f64)>,
    /// Lines skipped in lenient mode.
    pub skipped: Vec<MalformedLine>,
}

/// What happened while loading a score file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// `false` when no score file existed yet.
    pub file_found: bool,
    /// Entry counts from reconciling against the catalog.
    pub reconcile: ReconcileReport,
    /// Lines skipped in lenient mode.
    pub skipped: Vec<MalformedLine>,
}

/// A reconciled table together with its [`LoadReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTable {
    /// Scores for exactly the catalog's items.
    pub table: RatingTable,
    /// Details of the load.
    pub report: LoadReport,
}

/// Parse score file contents.
///
/// Lines end at `\n`, with an optional `\r` before it. Lines holding only
/// whitespace are ignored. The key and score are split at the last `:`, so
/// keys may contain colons. The key is taken verbatim, surrounding spaces
/// included, while whitespace around the score is ignored. A line that is not
/// valid UTF-8 is malformed on its own and does not affect the other lines.
///
/// # Errors
/// In [`ParseMode::Strict`] the first malformed line is returned as the
/// error. In [`ParseMode::Lenient`] malformed lines are collected in
/// [`ParsedScores::skipped`] instead.
///
/// # Examples
/// ```
/// use pairwise_store::{ParseMode, parse_scores};
///
/// let parsed = parse_scores("a.png:1016\n\nbroken\nb.png:984\n", ParseMode::Lenient)
///     .expect("lenient parsing never fails");
/// assert_eq!(parsed.entries.len(), 2);
/// assert_eq!(parsed.skipped[0].line, 3);
/// assert!(parse_scores("broken\n", ParseMode::Strict).is_err());
/// ```
pub fn parse_scores(
    contents: impl AsRef<[u8]>,
    mode: ParseMode,
) -> Result<ParsedScores, MalformedLine> {
    let mut parsed = ParsedScores::default();
    for (index, raw_line) in contents.as_ref().split(|&byte| byte == b'\n').enumerate() {
        let line = raw_line.strip_suffix(b"\r").unwrap_or(raw_line);
        let outcome = match std::str::from_utf8(line) {
            Ok(text) if text.trim().is_empty() => continue,
            Ok(text) => parse_line(text),
            Err(source) => Err(LineError::InvalidUtf8 { source }),
        };
        match outcome {
            Ok(entry) => parsed.entries.push(entry),
            Err(reason) => {
                let malformed = MalformedLine {
                    line: index + 1,
                    text: String::from_utf8_lossy(line).into_owned(),
                    reason,
                };
                if mode == ParseMode::Strict {
                    return Err(malformed);
                }
                parsed.skipped.push(malformed);
            }
        }
    }
    Ok(parsed)
}

fn parse_line(text: &str) -> Result<(Item, f64), LineError> {
    let (key, raw_score) = text.rsplit_once(':').ok_or(LineError::MissingSeparator)?;
    if key.is_empty() {
        return Err(LineError::EmptyKey);
    }
    let score_text = raw_score.trim();
    let score: f64 = score_text
        .parse()
        .map_err(|source| LineError::InvalidScore {
            raw: score_text.to_owned(),
            source,
        })?;
    if !score.is_finite() {
        return Err(LineError::NonFiniteScore {
            raw: score_text.to_owned(),
        });
    }
    Ok((Item::new(key), score))
}

/// Check that `key` can be written as the key of one score file line.
///
/// # Errors
/// [`LineError::EmptyKey`] for an empty key and [`LineError::LineBreakInKey`]
/// when the key holds `\n` or `\r`.
pub fn check_key(key: &str) -> Result<(), LineError> {
    if key.is_empty() {
        return Err(LineError::EmptyKey);
    }
    if key.contains(['\n', '\r']) {
        return Err(LineError::LineBreakInKey);
    }
    Ok(())
}

/// Render a table as score file contents, best-ranked first.
///
/// Scores use the shortest representation that parses back to the same
/// value, so a save followed by a load reproduces every score exactly.
///
/// # Errors
/// [`UnstorableKey`] for the first item whose key fails [`check_key`].
///
/// # Examples
/// ```
/// use pairwise_core::{Item, RatingTable};
/// use pairwise_store::render_scores;
///
/// let table: RatingTable = [(Item::new("b.png"), 984.0), (Item::new(" a.png"), 1016.0)]
///     .into_iter()
///     .collect();
/// assert_eq!(render_scores(&table).expect("storable keys"), " a.png:1016\nb.png:984\n");
///
/// let broken: RatingTable = [(Item::new("two\nlines.png"), 1000.0)].into_iter().collect();
/// assert!(render_scores(&broken).is_err());
/// ```
pub fn render_scores(table: &RatingTable) -> Result<String, UnstorableKey> {
    table
        .ranked()
        .into_iter()
        .map(|(item, score)| match check_key(item.as_str()) {
            Ok(()) => Ok(format!("{item}:{score}\n")),
            Err(reason) => Err(UnstorableKey { item, reason }),
        })
        .collect()
}

/// Score file on disk.
///
/// # Examples
/// ```no_run
/// use pairwise_core::{Catalog, DEFAULT_SCORE};
/// use pairwise_store::{ParseMode, ScoreFile};
///
/// let catalog = Catalog::from_items(["a.png", "b.png"]);
/// let store = ScoreFile::new("rankings.txt").with_mode(ParseMode::Strict);
/// let loaded = store.load(&catalog, DEFAULT_SCORE).expect("load scores");
/// store.save(&loaded.table).expect("save scores");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreFile {
    path: Utf8PathBuf,
    mode: ParseMode,
}

impl ScoreFile {
    /// Score file at `path`, parsed leniently.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: ParseMode::default(),
        }
    }

    /// Use `mode` for malformed lines.
    #[must_use]
    pub fn with_mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    /// Location of the score file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Active parse mode.
    #[must_use]
    pub const fn mode(&self) -> ParseMode {
        self.mode
    }

    /// Read and parse the file without reconciling.
    ///
    /// Returns `None` when the file does not exist.
    ///
    /// # Errors
    /// [`StoreError::Read`] when the file exists but cannot be read, and
    /// [`StoreError::Parse`] for a malformed line in strict mode.
    pub fn read(&self) -> Result<Option<ParsedScores>, StoreError> {
        let Some(contents) =
            read_if_exists(&self.path).map_err(|source| StoreError::Read {
                path: self.path.clone(),
                source,
            })?
        else {
            return Ok(None);
        };
        let parsed = parse_scores(&contents, self.mode).map_err(|malformed| StoreError::Parse {
            path: self.path.clone(),
            line: malformed.line,
            source: malformed.reason,
        })?;
        for skipped in &parsed.skipped {
            log::warn!(
                "skipping malformed line {} in {}: {} ({:?})",
                skipped.line,
                self.path,
                skipped.reason,
                skipped.text
            );
        }
        Ok(Some(parsed))
    }

    /// Load scores for `catalog`.
    ///
    /// Catalog items missing from the file start at `default_score`; file
    /// entries for items outside the catalog are dropped. A missing file is a
    /// first run and yields the default table.
    ///
    /// # Errors
    /// See [`ScoreFile::read`].
    pub fn load(&self, catalog: &Catalog, default_score: f64) -> Result<LoadedTable, StoreError> {
        let Some(parsed) = self.read()? else {
            log::info!(
                "no score file at {}; starting {} items at {default_score}",
                self.path,
                catalog.len()
            );
            let table = RatingTable::with_defaults(catalog, default_score);
            let report = LoadReport {
                file_found: false,
                reconcile: ReconcileReport {
                    restored: 0,
                    created: catalog.len(),
                    pruned: 0,
                },
                skipped: Vec::new(),
            };
            return Ok(LoadedTable { table, report });
        };

        let (table, reconcile) = RatingTable::reconcile(catalog, parsed.entries, default_score);
        log::info!(
            "loaded {} scores from {} ({} restored, {} new, {} stale)",
            table.len(),
            self.path,
            reconcile.restored,
            reconcile.created,
            reconcile.pruned
        );
        Ok(LoadedTable {
            table,
            report: LoadReport {
                file_found: true,
                reconcile,
                skipped: parsed.skipped,
            },
        })
    }

    /// Write every entry of `table`, replacing the file atomically.
    ///
    /// The parent directory is created when missing.
    ///
    /// # Errors
    /// [`StoreError::Unstorable`] when an item key cannot be written,
    /// [`StoreError::CreateParent`] when the directory cannot be created and
    /// [`StoreError::Persist`] when writing or renaming fails. In every case
    /// the previous file is left untouched.
    pub fn save(&self, table: &RatingTable) -> Result<(), StoreError> {
        let rendered = render_scores(table).map_err(|source| StoreError::Unstorable {
            path: self.path.clone(),
            source,
        })?;
        ensure_parent_dir(&self.path).map_err(|source| StoreError::CreateParent {
            path: self
                .path
                .parent()
                .map_or_else(|| Utf8Path::new(".").to_path_buf(), Utf8Path::to_path_buf),
            source,
        })?;
        write_atomically(&self.path, rendered.as_bytes()).map_err(|source| {
            StoreError::Persist {
                path: self.path.clone(),
                source,
            }
        })?;
        log::info!("saved {} scores to {}", table.len(), self.path);
        Ok(())
    }
}

impl RatingSink for ScoreFile {
    type Error = StoreError;

    fn persist(&self, table: &RatingTable) -> Result<(), Self::Error> {
        self.save(table)
    }
}
