//! Items under comparison and the catalog that enumerates them.
//!
//! An [`Item`] is an opaque, stable string key such as an image file name. A
//! [`Catalog`] is the ordered population of items for one session; the
//! [`ItemCatalog`] trait lets callers plug in whatever enumerates it.

use std::borrow::Borrow;
use std::fmt;

/// A single comparable entity, identified by a stable string key.
///
/// # Examples
/// ```
/// use pairwise_core::Item;
///
/// let item = Item::new("sunset.png");
/// assert_eq!(item.as_str(), "sunset.png");
/// assert_eq!(item.to_string(), "sunset.png");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Item(String);

impl Item {
    /// Wrap a key as an item.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the underlying key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the item and return its key.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Item {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for Item {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl Borrow<str> for Item {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Item {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The population of items available to a session.
///
/// Items are kept sorted lexicographically and de-duplicated, so two catalogs
/// built from the same names compare equal regardless of input order.
///
/// # Examples
/// ```
/// use pairwise_core::{Catalog, Item};
///
/// let catalog = Catalog::from_items(["b.png", "a.png", "b.png"]);
/// assert_eq!(catalog.len(), 2);
/// assert_eq!(catalog.items()[0], Item::new("a.png"));
/// assert!(catalog.contains("b.png"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    /// Build a catalog from any collection of item keys.
    pub fn from_items<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Item>,
    {
        let mut items: Vec<Item> = items.into_iter().map(Into::into).collect();
        items.sort();
        items.dedup();
        Self { items }
    }

    /// Items in lexicographic order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Return whether `key` names an item in the catalog.
    pub fn contains(&self, key: &str) -> bool {
        self.items
            .binary_search_by(|item| item.as_str().cmp(key))
            .is_ok()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Report whether the catalog holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over the items in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<Item> for Catalog {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        Self::from_items(iter)
    }
}

/// Enumerate the current population of comparable items.
///
/// Implementations are pure queries: they hold no state across calls and are
/// re-run at session start. Repeated calls without underlying changes must
/// return the same catalog.
///
/// # Examples
///
/// ```rust
/// use std::convert::Infallible;
/// use pairwise_core::{Catalog, ItemCatalog};
///
/// struct Fixed;
///
/// impl ItemCatalog for Fixed {
///     type Error = Infallible;
///
///     fn list_items(&self) -> Result<Catalog, Self::Error> {
///         Ok(Catalog::from_items(["a.png", "b.png"]))
///     }
/// }
///
/// assert_eq!(Fixed.list_items().map(|c| c.len()), Ok(2));
/// ```
pub trait ItemCatalog {
    /// Error raised when the population cannot be enumerated.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Return the current items in deterministic order.
    fn list_items(&self) -> Result<Catalog, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn catalog_sorts_and_deduplicates() {
        let catalog = Catalog::from_items(["c.jpg", "a.png", "c.jpg", "b.jpeg"]);
        let keys: Vec<&str> = catalog.iter().map(Item::as_str).collect();
        assert_eq!(keys, ["a.png", "b.jpeg", "c.jpg"]);
    }

    #[rstest]
    #[case("a.png", true)]
    #[case("z.png", false)]
    #[case("", false)]
    fn catalog_membership(#[case] key: &str, #[case] expected: bool) {
        let catalog = Catalog::from_items(["a.png", "b.png"]);
        assert_eq!(catalog.contains(key), expected);
    }

    #[rstest]
    fn empty_catalog_reports_empty() {
        let catalog = Catalog::default();
        assert!(catalog.is_empty());
        assert_eq!(catalog.len(), 0);
    }
}
