use tracing::warn;

use super::Database;
use crate::preference::PreferenceStore;

// Preferences are plain UTF-8 strings, stored without bincode framing so the
// tree stays readable with any sled tooling.
impl PreferenceStore for Database {
    fn get(&self, key: &str) -> Option<String> {
        match self.preference_tree.get(key) {
            Ok(Some(val)) => match String::from_utf8(val.to_vec()) {
                Ok(s) => Some(s),
                Err(e) => {
                    warn!("Ignoring non UTF-8 preference {key}: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("Problem while reading preference {key}. {e}");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.preference_tree.insert(key, value.as_bytes()) {
            warn!("Problem while writing preference {key}. {e}");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.preference_tree.remove(key) {
            warn!("Problem while removing preference {key}. {e}");
        }
    }
}
