//! Elo-style rating table and update rule.
//!
//! Scores live in a [`RatingTable`] whose key set always mirrors the current
//! [`Catalog`]. A [`Decision`] is the only thing that moves a score, and it
//! moves exactly two of them.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::{Catalog, Item};

/// Score assigned to an item the first time it is seen.
pub const DEFAULT_SCORE: f64 = 1000.0;

/// Default sensitivity of a single update.
pub const DEFAULT_K_FACTOR: f64 = 32.0;

/// Rating gap that shifts the expected win probability by a factor of ten.
const LOGISTIC_SCALE: f64 = 400.0;

/// Tunable constants of the rating model.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EloConfig {
    /// Maximum change of a single update. Larger values converge faster but
    /// noisier.
    pub k_factor: f64,
    /// Score given to items without a persisted rating.
    pub default_score: f64,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            k_factor: DEFAULT_K_FACTOR,
            default_score: DEFAULT_SCORE,
        }
    }
}

/// Probability that an item rated `rating` beats one rated `opponent`.
///
/// # Examples
/// ```
/// use pairwise_core::expected_score;
///
/// assert_eq!(expected_score(1000.0, 1000.0), 0.5);
/// assert!(expected_score(1200.0, 1000.0) > 0.75);
/// ```
pub fn expected_score(rating: f64, opponent: f64) -> f64 {
    1.0 / (1.0 + 10_f64.powf((opponent - rating) / LOGISTIC_SCALE))
}

/// An outcome reported by the presentation layer: `winner` beat `loser`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Decision {
    /// Preferred item.
    pub winner: Item,
    /// Rejected item.
    pub loser: Item,
}

impl Decision {
    /// Record that `winner` was preferred over `loser`.
    pub fn new(winner: impl Into<Item>, loser: impl Into<Item>) -> Self {
        Self {
            winner: winner.into(),
            loser: loser.into(),
        }
    }
}

/// Reasons a [`Decision`] cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidDecision {
    /// The winner and loser are the same item.
    #[error("item {item} cannot be compared with itself")]
    SelfComparison {
        /// The repeated item.
        item: Item,
    },
    /// The decision names an item the table does not rate.
    #[error("item {item} is not part of the rating table")]
    UnknownItem {
        /// The missing item.
        item: Item,
    },
}

/// Effect of one applied decision.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatingChange {
    /// Preferred item.
    pub winner: Item,
    /// Rejected item.
    pub loser: Item,
    /// Winner's score before the update.
    pub winner_before: f64,
    /// Winner's score after the update.
    pub winner_after: f64,
    /// Loser's score before the update.
    pub loser_before: f64,
    /// Loser's score after the update.
    pub loser_after: f64,
    /// Expected probability that the winner would win.
    pub expected: f64,
}

impl RatingChange {
    /// Points gained by the winner.
    pub fn gain(&self) -> f64 {
        self.winner_after - self.winner_before
    }

    /// Points lost by the loser.
    pub fn loss(&self) -> f64 {
        self.loser_before - self.loser_after
    }
}

/// Outcome counts of aligning persisted scores with a catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReconcileReport {
    /// Catalog items whose persisted score was restored.
    pub restored: usize,
    /// Catalog items with no persisted score, created at the default.
    pub created: usize,
    /// Persisted keys dropped because the catalog no longer lists them.
    pub pruned: usize,
}

/// Scores keyed by item.
///
/// # Examples
/// ```
/// use pairwise_core::{Catalog, DEFAULT_SCORE, Item, RatingTable};
///
/// let catalog = Catalog::from_items(["a.png", "b.png"]);
/// let persisted = vec![(Item::new("a.png"), 1100.0), (Item::new("gone.png"), 900.0)];
/// let (table, report) = RatingTable::reconcile(&catalog, persisted, DEFAULT_SCORE);
///
/// assert_eq!(table.get("a.png"), Some(1100.0));
/// assert_eq!(table.get("b.png"), Some(DEFAULT_SCORE));
/// assert_eq!(table.get("gone.png"), None);
/// assert_eq!(report.pruned, 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingTable {
    scores: BTreeMap<Item, f64>,
}

impl RatingTable {
    /// Give every catalog item the default score.
    pub fn with_defaults(catalog: &Catalog, default_score: f64) -> Self {
        Self {
            scores: catalog
                .iter()
                .map(|item| (item.clone(), default_score))
                .collect(),
        }
    }

    /// Merge persisted scores onto a default table for `catalog`.
    ///
    /// The result holds exactly the catalog's keys: persisted entries for
    /// unknown items are pruned and catalog items without an entry keep
    /// `default_score`. When a key repeats, the later entry wins.
    pub fn reconcile<I>(
        catalog: &Catalog,
        persisted: I,
        default_score: f64,
    ) -> (Self, ReconcileReport)
    where
        I: IntoIterator<Item = (Item, f64)>,
    {
        let mut table = Self::with_defaults(catalog, default_score);
        let mut restored = BTreeSet::new();
        let mut pruned = BTreeSet::new();
        for (item, score) in persisted {
            match table.scores.get_mut(item.as_str()) {
                Some(slot) => {
                    *slot = score;
                    restored.insert(item);
                }
                None => {
                    pruned.insert(item);
                }
            }
        }
        let report = ReconcileReport {
            restored: restored.len(),
            created: catalog.len() - restored.len(),
            pruned: pruned.len(),
        };
        log::debug!(
            "reconciled {} items: {} restored, {} created, {} pruned",
            catalog.len(),
            report.restored,
            report.created,
            report.pruned
        );
        (table, report)
    }

    /// Current score of `key`, if rated.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.scores.get(key).copied()
    }

    /// Return whether `key` is rated.
    pub fn contains(&self, key: &str) -> bool {
        self.scores.contains_key(key)
    }

    /// Number of rated items.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Report whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Iterate over `(item, score)` in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&Item, f64)> + '_ {
        self.scores.iter().map(|(item, score)| (item, *score))
    }

    /// Rated items in key order.
    pub fn items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.scores.keys()
    }

    /// Every entry ordered by score descending, ties by key ascending.
    pub fn ranked(&self) -> Vec<(Item, f64)> {
        let mut entries: Vec<(Item, f64)> = self
            .scores
            .iter()
            .map(|(item, score)| (item.clone(), *score))
            .collect();
        entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries
    }

    /// The `n` highest entries in [`RatingTable::ranked`] order.
    pub fn top_n(&self, n: usize) -> Vec<(Item, f64)> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }

    /// Apply `decision` with sensitivity `k_factor`.
    ///
    /// Both scores change together or not at all.
    ///
    /// # Errors
    /// Returns [`InvalidDecision`] when the winner and loser coincide or when
    /// either is missing from the table. The table is left unchanged.
    pub fn apply(
        &mut self,
        decision: &Decision,
        k_factor: f64,
    ) -> Result<RatingChange, InvalidDecision> {
        if decision.winner == decision.loser {
            return Err(InvalidDecision::SelfComparison {
                item: decision.winner.clone(),
            });
        }
        let winner_before = self.require(&decision.winner)?;
        let loser_before = self.require(&decision.loser)?;

        let expected = expected_score(winner_before, loser_before);
        let winner_after = winner_before + k_factor * (1.0 - expected);
        let loser_after = loser_before - k_factor * expected;

        self.scores.insert(decision.winner.clone(), winner_after);
        self.scores.insert(decision.loser.clone(), loser_after);

        log::debug!(
            "{} beat {}: {winner_before:.2} -> {winner_after:.2}, \
             {loser_before:.2} -> {loser_after:.2}",
            decision.winner,
            decision.loser
        );
        Ok(RatingChange {
            winner: decision.winner.clone(),
            loser: decision.loser.clone(),
            winner_before,
            winner_after,
            loser_before,
            loser_after,
            expected,
        })
    }

    fn require(&self, item: &Item) -> Result<f64, InvalidDecision> {
        self.get(item.as_str())
            .ok_or_else(|| InvalidDecision::UnknownItem { item: item.clone() })
    }
}

impl FromIterator<(Item, f64)> for RatingTable {
    fn from_iter<T: IntoIterator<Item = (Item, f64)>>(iter: T) -> Self {
        Self {
            scores: iter.into_iter().collect(),
        }
    }
}

/// Apply `decision` to `table` using the model in `config`.
///
/// # Errors
/// See [`RatingTable::apply`].
///
/// # Examples
/// ```
/// use pairwise_core::{Catalog, Decision, EloConfig, RatingTable, apply_decision};
///
/// let config = EloConfig::default();
/// let mut table = RatingTable::with_defaults(&Catalog::from_items(["a", "b"]), 1000.0);
/// let change = apply_decision(&mut table, &Decision::new("a", "b"), &config).unwrap();
/// assert_eq!(change.winner_after, 1016.0);
/// assert_eq!(table.get("b"), Some(984.0));
/// ```
pub fn apply_decision(
    table: &mut RatingTable,
    decision: &Decision,
    config: &EloConfig,
) -> Result<RatingChange, InvalidDecision> {
    table.apply(decision, config.k_factor)
}
