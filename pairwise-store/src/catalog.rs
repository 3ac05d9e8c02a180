//! Item catalog backed by a directory of image files.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use pairwise_core::{Catalog, Item, ItemCatalog};

use crate::{CatalogError, check_key};

/// File extensions recognised as images, compared case-insensitively.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Lists the image files directly inside one directory.
///
/// Each scan re-reads the directory, so files added or removed between
/// sessions are picked up. Sub-directories are never listed, and neither are
/// names that cannot be stored in a score file (see [`check_key`]).
///
/// # Examples
/// ```no_run
/// use pairwise_core::ItemCatalog;
/// use pairwise_store::DirectoryCatalog;
///
/// let catalog = DirectoryCatalog::new("images").list_items().expect("scan images");
/// for item in &catalog {
///     println!("{item}");
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryCatalog {
    dir: Utf8PathBuf,
    extensions: Vec<String>,
}

impl DirectoryCatalog {
    /// Catalog over `dir` recognising [`IMAGE_EXTENSIONS`].
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extensions: IMAGE_EXTENSIONS.iter().map(|ext| format!(".{ext}")).collect(),
        }
    }

    /// Replace the recognised extensions. A leading `.` is optional.
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|ext| format!(".{}", ext.as_ref().trim_start_matches('.').to_ascii_lowercase()))
            .collect();
        self
    }

    /// Directory being scanned.
    #[must_use]
    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    fn is_image(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        self.extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
    }

    fn read_error(&self, source: io::Error) -> CatalogError {
        CatalogError::ReadDirectory {
            path: self.dir.clone(),
            source,
        }
    }
}

impl ItemCatalog for DirectoryCatalog {
    type Error = CatalogError;

    fn list_items(&self) -> Result<Catalog, Self::Error> {
        let dir = pairwise_fs::open_ambient_dir(&self.dir).map_err(|source| {
            CatalogError::OpenDirectory {
                path: self.dir.clone(),
                source,
            }
        })?;
        let entries = dir.entries().map_err(|source| self.read_error(source))?;

        let mut items = Vec::new();
        for next in entries {
            let entry = next.map_err(|source| self.read_error(source))?;
            let name = match entry.file_name() {
                Ok(name) => name,
                Err(err) => {
                    log::warn!("skipping entry with a non-UTF-8 name in {}: {err}", self.dir);
                    continue;
                }
            };
            if !self.is_image(&name) {
                continue;
            }
            if let Err(reason) = check_key(&name) {
                log::warn!("skipping {name:?} in {}: {reason}", self.dir);
                continue;
            }
            let file_type = entry.file_type().map_err(|source| self.read_error(source))?;
            if file_type.is_dir() {
                log::debug!("skipping directory {name} in {}", self.dir);
                continue;
            }
            items.push(Item::new(name));
        }

        let catalog = Catalog::from_items(items);
        log::info!("found {} images in {}", catalog.len(), self.dir);
        Ok(catalog)
    }
}
