//! Core domain types for pairwise ranking.
//!
//! Items are ranked by repeated pairwise comparison. Each binary choice moves
//! an Elo-style score, and the resulting [`RatingTable`] is reconciled against
//! the current [`Catalog`] whenever it is loaded. The crate performs no I/O:
//! enumerating items ([`ItemCatalog`]) and persisting scores ([`RatingSink`])
//! are collaborators supplied by the caller.
//!
//! # Examples
//!
//! ```
//! use pairwise_core::{Catalog, Choice, RatingTable, Session, SessionConfig};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let catalog = Catalog::from_items(["a.png", "b.png", "c.png"]);
//! let table = RatingTable::with_defaults(&catalog, 1000.0);
//! let mut session = Session::new(table, SessionConfig::default(), StdRng::seed_from_u64(9));
//!
//! let pair = session.next_pair().expect("three items").clone();
//! session.decide(Choice::First).expect("pair on display");
//! assert_eq!(session.table().get(pair.first().as_str()), Some(1016.0));
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod item;
pub mod pairing;
pub mod rating;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use item::{Catalog, Item, ItemCatalog};
pub use pairing::{Choice, ComparisonPair, RecentPairs, next_pair};
pub use rating::{
    DEFAULT_K_FACTOR, DEFAULT_SCORE, Decision, EloConfig, InvalidDecision, RatingChange,
    RatingTable, ReconcileReport, apply_decision, expected_score,
};
pub use session::{RatingSink, Session, SessionConfig, SessionError, SessionState};
