//! Comparison session state machine.
//!
//! A [`Session`] owns the rating table for the lifetime of one ranking run and
//! walks through `AwaitingPair -> PairShown -> AwaitingPair` for every vote.
//! It has no knowledge of how pairs are displayed or how votes are captured;
//! the caller drives it and hands it a [`RatingSink`] to persist into.

use rand::Rng;
use thiserror::Error;

use crate::pairing::RecentPairs;
use crate::{
    Choice, ComparisonPair, Decision, EloConfig, InvalidDecision, Item, RatingChange, RatingTable,
};

/// Durable destination for a rating table.
///
/// Implementations must replace the previous snapshot atomically: a failed
/// call leaves the earlier snapshot readable.
pub trait RatingSink {
    /// Error raised when the table cannot be persisted.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist every entry of `table`.
    fn persist(&self, table: &RatingTable) -> Result<(), Self::Error>;
}

impl<S: RatingSink + ?Sized> RatingSink for &S {
    type Error = S::Error;

    fn persist(&self, table: &RatingTable) -> Result<(), Self::Error> {
        (**self).persist(table)
    }
}

/// Settings for a comparison session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionConfig {
    /// Rating model constants.
    pub elo: EloConfig,
    /// Number of recently shown pairs to steer away from. Zero keeps plain
    /// uniform selection.
    pub recent_window: usize,
}

/// Observable state of a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Ready to propose the next pair.
    AwaitingPair,
    /// A pair is on display and waiting for a vote.
    PairShown,
    /// Fewer than two items exist; no pair can ever be proposed.
    Exhausted,
    /// The session has been finished and persisted.
    Ended,
}

/// Errors returned by [`Session`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The catalog is too small to form a pair.
    #[error("at least two items are required to compare, found {available}")]
    NotEnoughItems {
        /// Number of rated items.
        available: usize,
    },
    /// A vote arrived while no pair was on display.
    #[error("no pair is awaiting a decision")]
    NoPairShown,
    /// A vote named an item outside the shown pair.
    #[error("item {item} is not part of the shown pair")]
    NotInShownPair {
        /// The item that was voted for.
        item: Item,
    },
    /// The session has already ended.
    #[error("the session has ended")]
    Ended,
    /// The rating update rejected the decision.
    #[error(transparent)]
    InvalidDecision(#[from] InvalidDecision),
}

/// One ranking run over a rating table.
///
/// # Examples
/// ```
/// use pairwise_core::{Catalog, Choice, RatingTable, Session, SessionConfig, SessionState};
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let table = RatingTable::with_defaults(&Catalog::from_items(["a", "b"]), 1000.0);
/// let mut session = Session::new(table, SessionConfig::default(), StdRng::seed_from_u64(1));
///
/// session.next_pair().expect("two items");
/// assert_eq!(session.state(), SessionState::PairShown);
/// let change = session.decide(Choice::First).expect("pair shown");
/// assert_eq!(change.gain(), 16.0);
/// assert!(session.decide(Choice::First).is_err());
/// ```
#[derive(Debug)]
pub struct Session<R> {
    table: RatingTable,
    items: Vec<Item>,
    config: SessionConfig,
    rng: R,
    shown: Option<ComparisonPair>,
    recent: RecentPairs,
    decisions: usize,
    ended: bool,
}

impl<R: Rng> Session<R> {
    /// Start a session over `table`. The table's keys are the comparable items.
    pub fn new(table: RatingTable, config: SessionConfig, rng: R) -> Self {
        let items: Vec<Item> = table.items().cloned().collect();
        if items.len() < 2 {
            log::warn!("session started with {} item(s); nothing to compare", items.len());
        }
        Self {
            table,
            items,
            config,
            rng,
            shown: None,
            recent: RecentPairs::new(config.recent_window),
            decisions: 0,
            ended: false,
        }
    }

    /// Current state of the session.
    pub fn state(&self) -> SessionState {
        if self.ended {
            SessionState::Ended
        } else if self.items.len() < 2 {
            SessionState::Exhausted
        } else if self.shown.is_some() {
            SessionState::PairShown
        } else {
            SessionState::AwaitingPair
        }
    }

    /// Propose the next pair, or return the one already on display.
    ///
    /// # Errors
    /// [`SessionError::NotEnoughItems`] when fewer than two items exist and
    /// [`SessionError::Ended`] after [`Session::finish`].
    pub fn next_pair(&mut self) -> Result<&ComparisonPair, SessionError> {
        if self.ended {
            return Err(SessionError::Ended);
        }
        if self.shown.is_none() {
            let pair = self.recent.draw(&self.items, &mut self.rng).ok_or(
                SessionError::NotEnoughItems {
                    available: self.items.len(),
                },
            )?;
            self.recent.remember(&pair);
            self.shown = Some(pair);
        }
        self.shown.as_ref().ok_or(SessionError::NoPairShown)
    }

    /// The pair on display, if any.
    pub fn shown(&self) -> Option<&ComparisonPair> {
        self.shown.as_ref()
    }

    /// Vote for one side of the shown pair.
    ///
    /// Exactly one vote is accepted per shown pair; repeats fail with
    /// [`SessionError::NoPairShown`] and change nothing.
    ///
    /// # Errors
    /// See [`SessionError`].
    pub fn decide(&mut self, choice: Choice) -> Result<RatingChange, SessionError> {
        let decision = self.shown_pair()?.decide(choice);
        self.commit(&decision)
    }

    /// Vote for the shown item named `winner`.
    ///
    /// # Errors
    /// [`SessionError::NotInShownPair`] when `winner` is not on display, plus
    /// the errors of [`Session::decide`].
    pub fn decide_item(&mut self, winner: &str) -> Result<RatingChange, SessionError> {
        let decision = self
            .shown_pair()?
            .decide_for(winner)
            .ok_or_else(|| SessionError::NotInShownPair {
                item: Item::new(winner),
            })?;
        self.commit(&decision)
    }

    /// Discard the shown pair without a vote.
    ///
    /// # Errors
    /// [`SessionError::NoPairShown`] when nothing is on display.
    pub fn skip(&mut self) -> Result<ComparisonPair, SessionError> {
        if self.ended {
            return Err(SessionError::Ended);
        }
        self.shown.take().ok_or(SessionError::NoPairShown)
    }

    /// Persist the current table without ending the session.
    ///
    /// # Errors
    /// Propagates the sink's error; the session stays usable.
    pub fn checkpoint<S: RatingSink>(&self, sink: &S) -> Result<(), S::Error> {
        sink.persist(&self.table)?;
        log::debug!("checkpointed {} ratings after {} decisions", self.table.len(), self.decisions);
        Ok(())
    }

    /// Persist the table and stop proposing pairs.
    ///
    /// Any pair on display is dropped without a vote. When persisting fails the
    /// session keeps running so the caller can retry.
    ///
    /// # Errors
    /// Propagates the sink's error.
    pub fn finish<S: RatingSink>(&mut self, sink: &S) -> Result<(), S::Error> {
        sink.persist(&self.table)?;
        self.shown = None;
        self.ended = true;
        log::info!(
            "session ended after {} decisions over {} items",
            self.decisions,
            self.items.len()
        );
        Ok(())
    }

    /// Number of votes applied so far.
    pub fn decisions(&self) -> usize {
        self.decisions
    }

    /// Read-only view of the current scores.
    pub fn table(&self) -> &RatingTable {
        &self.table
    }

    /// Settings this session runs with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Consume the session and return its table.
    pub fn into_table(self) -> RatingTable {
        self.table
    }

    fn shown_pair(&self) -> Result<&ComparisonPair, SessionError> {
        if self.ended {
            return Err(SessionError::Ended);
        }
        self.shown.as_ref().ok_or(SessionError::NoPairShown)
    }

    fn commit(&mut self, decision: &Decision) -> Result<RatingChange, SessionError> {
        let change = self.table.apply(decision, self.config.elo.k_factor)?;
        self.shown = None;
        self.decisions += 1;
        Ok(change)
    }
}
