//! Visitor favorites, persisted locally and broadcast to every view.

use std::{collections::BTreeSet, sync::Arc};

use tokio::sync::watch;
use tracing::warn;

use crate::preference::PreferenceStore;

pub const FAVORITES_KEY: &str = "propertyFavorites";

pub type FavoritesSet = BTreeSet<String>;

/// Reads the persisted favorites. Missing or malformed values yield an empty
/// set.
pub fn load_favorites(store: &dyn PreferenceStore) -> FavoritesSet {
    let Some(raw) = store.get(FAVORITES_KEY) else {
        return FavoritesSet::new();
    };
    match serde_json::from_str::<Vec<String>>(&raw) {
        Ok(ids) => ids.into_iter().collect(),
        Err(e) => {
            warn!("Ignoring malformed favorites: {e}");
            FavoritesSet::new()
        }
    }
}

fn save_favorites(store: &dyn PreferenceStore, favorites: &FavoritesSet) {
    match serde_json::to_string(favorites) {
        Ok(raw) => store.set(FAVORITES_KEY, &raw),
        Err(e) => warn!("Problem while saving favorites. {e}"),
    }
}

/// In-process publish/subscribe channel carrying the full favorites set.
///
/// Subscribers always observe the most recently published set.
#[derive(Clone)]
pub struct FavoritesChannel {
    tx: Arc<watch::Sender<FavoritesSet>>,
}

impl FavoritesChannel {
    pub fn new(initial: FavoritesSet) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// A channel seeded with the persisted favorites.
    pub fn load(store: &dyn PreferenceStore) -> Self {
        Self::new(load_favorites(store))
    }

    pub fn publish(&self, favorites: FavoritesSet) {
        self.tx.send_replace(favorites);
    }

    pub fn subscribe(&self) -> watch::Receiver<FavoritesSet> {
        self.tx.subscribe()
    }

    pub fn latest(&self) -> FavoritesSet {
        self.tx.borrow().clone()
    }
}

/// One view's handle on the favorites.
pub struct Favorites {
    store: Arc<dyn PreferenceStore>,
    channel: FavoritesChannel,
    rx: watch::Receiver<FavoritesSet>,
    local: FavoritesSet,
}

impl Favorites {
    pub fn new(store: Arc<dyn PreferenceStore>, channel: FavoritesChannel) -> Self {
        let mut rx = channel.subscribe();
        let local = rx.borrow_and_update().clone();
        Self {
            store,
            channel,
            rx,
            local,
        }
    }

    /// Adopts the latest published set, if another view changed it.
    pub fn refresh(&mut self) {
        if self.rx.has_changed().unwrap_or(false) {
            self.local = self.rx.borrow_and_update().clone();
        }
    }

    pub fn favorites(&mut self) -> &FavoritesSet {
        self.refresh();
        &self.local
    }

    pub fn is_favorite(&mut self, id: &str) -> bool {
        self.favorites().contains(id)
    }

    /// Flips membership of `id`, persists and publishes the new set. Returns
    /// whether `id` is now a favorite.
    pub fn toggle(&mut self, id: &str) -> bool {
        self.refresh();
        let mut next = self.local.clone();
        let added = if next.remove(id) {
            false
        } else {
            next.insert(id.to_string());
            true
        };
        save_favorites(self.store.as_ref(), &next);
        self.local = next.clone();
        self.channel.publish(next);
        // Our own publish is not news to this view.
        drop(self.rx.borrow_and_update());
        added
    }
}
