pub(crate) mod interaction;
pub(crate) mod preference;
pub(crate) mod property;
pub(crate) mod site_settings;

use std::{marker::PhantomData, path::Path};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use sled::Tree;

pub use self::{
    interaction::{Interaction, InteractionKind, InteractionSource},
    property::{Address, PropertyRecord, PropertyStatus, PropertyType},
    site_settings::SiteSettings,
};

const PROPERTY_TREE: &str = "properties";
const INTERACTION_TREE: &str = "interactions";
const PREFERENCE_TREE: &str = "preferences";
const SETTINGS_TREE: &str = "settings";

#[derive(Clone)]
pub struct Database {
    property_tree: Tree,
    interaction_tree: Tree,
    preference_tree: Tree,
    settings_tree: Tree,
}

impl Database {
    pub fn connect(path: &Path) -> Result<Database> {
        let db = sled::open(path)
            .with_context(|| format!("cannot open database at {}", path.display()))?;
        let property_tree = db.open_tree(PROPERTY_TREE)?;
        let interaction_tree = db.open_tree(INTERACTION_TREE)?;
        let preference_tree = db.open_tree(PREFERENCE_TREE)?;
        let settings_tree = db.open_tree(SETTINGS_TREE)?;
        Ok(Database {
            property_tree,
            interaction_tree,
            preference_tree,
            settings_tree,
        })
    }

    fn insert<T: Serialize>(key: &str, val: &T, tree: &Tree) -> Result<()> {
        tree.insert(key, bincode::serialize(val)?)?;
        Ok(())
    }

    fn select<T: DeserializeOwned>(key: &str, tree: &Tree) -> Result<Option<T>> {
        match tree.get(key)? {
            Some(val) => Ok(Some(bincode::deserialize(&val).with_context(|| {
                format!("invalid value in database for key {key}")
            })?)),
            None => Ok(None),
        }
    }
}

/// Builds a value out of one raw database entry.
pub(crate) trait TryFromKeyValue: Sized {
    fn try_from_key_value(key: &[u8], value: &[u8]) -> Result<Self>;
}

/// Decoding iterator over one sled tree.
pub struct Iter<T> {
    inner: sled::Iter,
    phantom: PhantomData<T>,
}

impl<T> Iter<T> {
    fn new(inner: sled::Iter) -> Self {
        Self {
            inner,
            phantom: PhantomData,
        }
    }
}

impl<T: TryFromKeyValue> Iterator for Iter<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|item| {
            let (key, value) = item?;
            T::try_from_key_value(&key, &value)
        })
    }
}

impl<T: TryFromKeyValue> DoubleEndedIterator for Iter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|item| {
            let (key, value) = item?;
            T::try_from_key_value(&key, &value)
        })
    }
}

#[cfg(test)]
pub(crate) fn test_database() -> (tempfile::TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::connect(dir.path()).unwrap();
    (dir, db)
}

#[cfg(test)]
impl Database {
    /// Stores `value` under `key` without encoding it.
    pub(crate) fn insert_raw_property(&self, key: &str, value: &[u8]) {
        self.property_tree.insert(key, value).unwrap();
    }
}
