use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::preference::PreferenceStore;

pub const CONSENT_KEY: &str = "cookieConsent";

/// Cookie categories a visitor agreed to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CookiePreferences {
    pub necessary: bool,
    pub analytics: bool,
    pub marketing: bool,
    pub personalization: bool,
}

impl Default for CookiePreferences {
    fn default() -> Self {
        Self {
            necessary: true,
            analytics: false,
            marketing: false,
            personalization: false,
        }
    }
}

pub struct CookieConsent {
    store: Arc<dyn PreferenceStore>,
    preferences: CookiePreferences,
    has_consent: bool,
}

impl CookieConsent {
    pub fn load(store: Arc<dyn PreferenceStore>) -> Self {
        let stored = store.get(CONSENT_KEY).and_then(|raw| {
            serde_json::from_str::<CookiePreferences>(&raw)
                .map_err(|e| warn!("Ignoring malformed cookie consent: {e}"))
                .ok()
        });
        Self {
            store,
            has_consent: stored.is_some(),
            preferences: stored.unwrap_or_default(),
        }
    }

    pub fn preferences(&self) -> CookiePreferences {
        self.preferences
    }

    pub fn has_consent(&self) -> bool {
        self.has_consent
    }

    pub fn save(&mut self, preferences: CookiePreferences) {
        match serde_json::to_string(&preferences) {
            Ok(raw) => self.store.set(CONSENT_KEY, &raw),
            Err(e) => warn!("Problem while saving cookie consent. {e}"),
        }
        self.preferences = preferences;
        self.has_consent = true;
        info!(
            analytics = preferences.analytics,
            marketing = preferences.marketing,
            "Cookie consent saved"
        );
    }

    pub fn reset(&mut self) {
        self.store.remove(CONSENT_KEY);
        self.preferences = CookiePreferences::default();
        self.has_consent = false;
        info!("Cookie consent reset, optional cookies disabled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preference::MemoryPreferences;

    #[test]
    fn no_consent_until_saved() {
        let store = Arc::new(MemoryPreferences::new());
        let mut consent = CookieConsent::load(store.clone());
        assert!(!consent.has_consent());
        assert_eq!(consent.preferences(), CookiePreferences::default());

        let chosen = CookiePreferences {
            analytics: true,
            ..Default::default()
        };
        consent.save(chosen);
        assert!(consent.has_consent());

        let reloaded = CookieConsent::load(store.clone());
        assert!(reloaded.has_consent());
        assert_eq!(reloaded.preferences(), chosen);

        consent.reset();
        assert!(store.get(CONSENT_KEY).is_none());
        assert!(!CookieConsent::load(store).has_consent());
    }

    #[test]
    fn malformed_consent_falls_back_to_default() {
        let store = Arc::new(MemoryPreferences::new());
        store.set(CONSENT_KEY, "analytics=yes");
        let consent = CookieConsent::load(store);
        assert!(!consent.has_consent());
        assert_eq!(consent.preferences(), CookiePreferences::default());
    }
}
