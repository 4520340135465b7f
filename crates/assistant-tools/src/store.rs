//! Flat JSON list storage
//!
//! Backs the reminder and to-do tools. The whole list lives in memory and
//! the file is rewritten (pretty-printed) after every mutation. There is no
//! cross-process locking.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;

use crate::error::Result;

/// Store shared between a tool and the HTTP listings
pub type SharedStore<T> = Arc<Mutex<JsonListStore<T>>>;

/// Ordered list persisted as a JSON array
#[derive(Debug)]
pub struct JsonListStore<T> {
    path: PathBuf,
    items: Vec<T>,
}

impl<T> JsonListStore<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    /// Load the list at `path`; a missing file is an empty list
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let items = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => Vec::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), count = items.len(), "Loaded list store");
        Ok(Self { path, items })
    }

    /// Open and wrap for sharing
    ///
    /// # Errors
    ///
    /// See [`JsonListStore::open`].
    pub fn shared(path: impl Into<PathBuf>) -> Result<SharedStore<T>> {
        Ok(Arc::new(Mutex::new(Self::open(path)?)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Items in insertion order
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append and persist
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written; the list is left unchanged.
    pub fn push(&mut self, item: T) -> Result<()> {
        self.items.push(item);
        if let Err(e) = self.save() {
            self.items.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Remove by position and persist; `None` when out of range
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written; the item is put back.
    pub fn remove(&mut self, index: usize) -> Result<Option<T>> {
        if index >= self.items.len() {
            return Ok(None);
        }
        let removed = self.items.remove(index);
        if let Err(e) = self.save() {
            self.items.insert(index, removed);
            return Err(e);
        }
        Ok(Some(removed))
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&self.items)?)?;
        Ok(())
    }
}
