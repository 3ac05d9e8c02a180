//! Test-only, in-memory collaborators used by unit and behaviour tests.

use std::cell::{Cell, RefCell};
use std::convert::Infallible;

use thiserror::Error;

use crate::{Catalog, ItemCatalog, RatingSink, RatingTable};

/// In-memory `ItemCatalog` returning a fixed population.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    catalog: Catalog,
}

impl MemoryCatalog {
    /// Create a catalog from item keys.
    pub fn with_items<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<crate::Item>,
    {
        Self {
            catalog: Catalog::from_items(items),
        }
    }
}

impl ItemCatalog for MemoryCatalog {
    type Error = Infallible;

    fn list_items(&self) -> Result<Catalog, Self::Error> {
        Ok(self.catalog.clone())
    }
}

/// Error returned by a [`MemorySink`] configured to fail.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("memory sink rejected the table")]
pub struct MemorySinkError;

/// `RatingSink` that keeps the last persisted table in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    last: RefCell<Option<RatingTable>>,
    writes: Cell<usize>,
    fail: bool,
}

impl MemorySink {
    /// A sink whose every write fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// The most recently persisted table.
    pub fn last(&self) -> Option<RatingTable> {
        self.last.borrow().clone()
    }

    /// Number of successful writes.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl RatingSink for MemorySink {
    type Error = MemorySinkError;

    fn persist(&self, table: &RatingTable) -> Result<(), Self::Error> {
        if self.fail {
            return Err(MemorySinkError);
        }
        *self.last.borrow_mut() = Some(table.clone());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
