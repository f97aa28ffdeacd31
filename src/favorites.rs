//! Favorite songs, persisted through a key-value store.
//!
//! The set is loaded once at startup and written back in full after every
//! change. Persistence problems are logged and otherwise ignored.

mod store;

use std::collections::BTreeSet;

use log::{debug, warn};

use crate::library::{Catalog, Song};

pub use store::{KeyValueStore, MemoryStore, StoreError, TomlFileStore};

/// Key under which the favorites set is stored.
pub const FAVORITES_KEY: &str = "favorites";

pub struct FavoritesStore {
    store: Box<dyn KeyValueStore>,
    ids: BTreeSet<String>,
}

impl FavoritesStore {
    /// Load the persisted set. Any failure leaves it empty.
    pub fn load(store: Box<dyn KeyValueStore>) -> Self {
        let ids = match store.get(FAVORITES_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(ids) => ids.into_iter().collect(),
                Err(e) => {
                    warn!("ignoring malformed favorites: {e}");
                    BTreeSet::new()
                }
            },
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                warn!("cannot load favorites: {e}");
                BTreeSet::new()
            }
        };
        debug!("loaded {} favorites", ids.len());
        Self { store, ids }
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Add `id` if absent, remove it if present, then persist.
    pub fn toggle_favorite(&mut self, id: &str) {
        if !self.ids.remove(id) {
            self.ids.insert(id.to_string());
        }
        self.persist();
    }

    /// Favorited songs still present in `catalog`, in catalog order.
    pub fn favorite_songs(&self, catalog: &Catalog) -> Vec<Song> {
        catalog
            .iter()
            .filter(|s| self.ids.contains(&s.id))
            .cloned()
            .collect()
    }

    /// Number of favorited ids, including ids missing from the catalog.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    fn persist(&mut self) {
        let ids: Vec<&String> = self.ids.iter().collect();
        let raw = match serde_json::to_string(&ids) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("cannot encode favorites: {e}");
                return;
            }
        };
        if let Err(e) = self.store.set(FAVORITES_KEY, &raw) {
            warn!("cannot save favorites: {e}");
        }
    }
}
