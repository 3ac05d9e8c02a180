//! Selection of comparison pairs.
//!
//! The base rule draws two distinct items uniformly at random without
//! replacement. Sessions may additionally steer away from recently shown
//! pairs; see [`RecentPairs`].

use std::collections::VecDeque;

use rand::Rng;
use rand::seq::index;

use crate::{Decision, Item};

/// Random draws attempted before falling back to enumerating fresh pairs.
const MAX_REDRAWS: usize = 32;

/// Which side of a shown pair the user preferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Choice {
    /// The item presented first (left).
    First,
    /// The item presented second (right).
    Second,
}

/// Two distinct items proposed for comparison.
///
/// The pair has a presentation order (`first`, `second`) but is compared as an
/// unordered pair by [`ComparisonPair::same_items`].
///
/// # Examples
/// ```
/// use pairwise_core::{Choice, ComparisonPair};
///
/// let pair = ComparisonPair::new("a.png", "b.png").expect("distinct items");
/// let decision = pair.decide(Choice::Second);
/// assert_eq!(decision.winner.as_str(), "b.png");
/// assert!(ComparisonPair::new("a.png", "a.png").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComparisonPair {
    first: Item,
    second: Item,
}

impl ComparisonPair {
    /// Pair two items, or `None` when they are the same item.
    pub fn new(first: impl Into<Item>, second: impl Into<Item>) -> Option<Self> {
        let first = first.into();
        let second = second.into();
        (first != second).then_some(Self { first, second })
    }

    /// Item presented first.
    pub fn first(&self) -> &Item {
        &self.first
    }

    /// Item presented second.
    pub fn second(&self) -> &Item {
        &self.second
    }

    /// Return whether `key` is one of the two items.
    pub fn contains(&self, key: &str) -> bool {
        self.first.as_str() == key || self.second.as_str() == key
    }

    /// Compare as unordered pairs.
    pub fn same_items(&self, other: &Self) -> bool {
        self.key() == other.key()
    }

    /// Decision in favour of the chosen side.
    pub fn decide(&self, choice: Choice) -> Decision {
        match choice {
            Choice::First => Decision::new(self.first.clone(), self.second.clone()),
            Choice::Second => Decision::new(self.second.clone(), self.first.clone()),
        }
    }

    /// Decision in favour of `winner`, if it belongs to the pair.
    pub fn decide_for(&self, winner: &str) -> Option<Decision> {
        if self.first.as_str() == winner {
            Some(self.decide(Choice::First))
        } else if self.second.as_str() == winner {
            Some(self.decide(Choice::Second))
        } else {
            None
        }
    }

    fn key(&self) -> (&Item, &Item) {
        if self.first <= self.second {
            (&self.first, &self.second)
        } else {
            (&self.second, &self.first)
        }
    }
}

/// Draw two distinct items uniformly at random without replacement.
///
/// Returns `None` when fewer than two items are available.
///
/// # Examples
/// ```
/// use pairwise_core::{Item, next_pair};
///
/// let items = [Item::new("a"), Item::new("b"), Item::new("c")];
/// let pair = next_pair(&items, &mut rand::thread_rng()).expect("enough items");
/// assert_ne!(pair.first(), pair.second());
/// assert!(next_pair(&items[..1], &mut rand::thread_rng()).is_none());
/// ```
pub fn next_pair<R: Rng + ?Sized>(items: &[Item], rng: &mut R) -> Option<ComparisonPair> {
    if items.len() < 2 {
        return None;
    }
    let picked = index::sample(rng, items.len(), 2);
    let first = items.get(picked.index(0))?;
    let second = items.get(picked.index(1))?;
    ComparisonPair::new(first.clone(), second.clone())
}

/// Bounded memory of the most recently shown pairs.
///
/// A window of zero remembers nothing, which reduces [`RecentPairs::draw`] to
/// [`next_pair`].
#[derive(Debug, Clone, Default)]
pub struct RecentPairs {
    window: usize,
    pairs: VecDeque<ComparisonPair>,
}

impl RecentPairs {
    /// Remember up to `window` pairs.
    pub fn new(window: usize) -> Self {
        Self {
            window,
            pairs: VecDeque::with_capacity(window),
        }
    }

    /// Return whether `pair` (in either order) was shown recently.
    pub fn contains(&self, pair: &ComparisonPair) -> bool {
        self.pairs.iter().any(|seen| seen.same_items(pair))
    }

    /// Record `pair` as the most recent, evicting the oldest beyond the window.
    pub fn remember(&mut self, pair: &ComparisonPair) {
        if self.window == 0 {
            return;
        }
        self.pairs.retain(|seen| !seen.same_items(pair));
        if self.pairs.len() == self.window {
            self.pairs.pop_front();
        }
        self.pairs.push_back(pair.clone());
    }

    /// Number of remembered pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Report whether nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Draw a pair that was not shown recently, when one exists.
    ///
    /// When every possible pair is remembered the draw is plain uniform.
    pub fn draw<R: Rng + ?Sized>(&self, items: &[Item], rng: &mut R) -> Option<ComparisonPair> {
        let candidate = next_pair(items, rng)?;
        if self.pairs.is_empty() || !self.contains(&candidate) {
            return Some(candidate);
        }
        let possible = items.len() * (items.len() - 1) / 2;
        if self.pairs.len() >= possible {
            return Some(candidate);
        }
        for _ in 0..MAX_REDRAWS {
            let redraw = next_pair(items, rng)?;
            if !self.contains(&redraw) {
                return Some(redraw);
            }
        }
        self.draw_fresh(items, rng).or(Some(candidate))
    }

    fn draw_fresh<R: Rng + ?Sized>(&self, items: &[Item], rng: &mut R) -> Option<ComparisonPair> {
        let fresh: Vec<ComparisonPair> = items
            .iter()
            .enumerate()
            .flat_map(|(i, first)| {
                items
                    .iter()
                    .skip(i + 1)
                    .filter_map(move |second| ComparisonPair::new(first.clone(), second.clone()))
            })
            .filter(|pair| !self.contains(pair))
            .collect();
        if fresh.is_empty() {
            return None;
        }
        fresh.get(rng.gen_range(0..fresh.len())).cloned()
    }
}
