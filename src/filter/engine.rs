use std::sync::{
    atomic::{AtomicU64, Ordering},
    Mutex, PoisonError,
};

use tracing::{debug, warn};

use super::{apply_local_filters, build_query, FilterCriteria};
use crate::{database::PropertyRecord, favorites::FavoritesSet, store::DataStore};

/// What a listing view shows for one request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchOutcome {
    pub records: Vec<PropertyRecord>,
    /// Set when the store query failed; `records` is then empty.
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SearchResult {
    Current(SearchOutcome),
    /// A newer search was issued while this one was in flight. Its response
    /// was discarded.
    Superseded,
}

#[derive(Default)]
struct Displayed {
    criteria: FilterCriteria,
    fetched: Vec<PropertyRecord>,
    outcome: SearchOutcome,
}

/// Runs searches against a data store so that the displayed results always
/// belong to the most recently requested criteria.
pub struct FilterEngine<S> {
    store: S,
    generation: AtomicU64,
    displayed: Mutex<Displayed>,
}

impl<S: DataStore> FilterEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            generation: AtomicU64::new(0),
            displayed: Mutex::new(Displayed::default()),
        }
    }

    /// Queries the store with `criteria` and applies the local filters.
    ///
    /// A failed store query yields an empty result with an error message and
    /// is not retried.
    pub async fn search(&self, criteria: &FilterCriteria, favorites: &FavoritesSet) -> SearchResult {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = build_query(criteria);
        let (fetched, error) = match self.store.query(&query).await {
            Ok(records) => (records, None),
            Err(e) => {
                warn!("Problem while loading properties. {e:#}");
                (Vec::new(), Some(e.to_string()))
            }
        };

        let mut displayed = self.displayed.lock().unwrap_or_else(PoisonError::into_inner);
        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(ticket, "Discarding stale search response");
            return SearchResult::Superseded;
        }
        let outcome = SearchOutcome {
            records: apply_local_filters(fetched.clone(), criteria, favorites),
            error,
        };
        *displayed = Displayed {
            criteria: criteria.clone(),
            fetched,
            outcome: outcome.clone(),
        };
        SearchResult::Current(outcome)
    }

    /// Re-applies the local filters of the displayed search against a new
    /// favorites set, without querying the store.
    pub fn on_favorites_changed(&self, favorites: &FavoritesSet) -> SearchOutcome {
        let mut displayed = self.displayed.lock().unwrap_or_else(PoisonError::into_inner);
        if displayed.criteria.favorites_only {
            displayed.outcome.records =
                apply_local_filters(displayed.fetched.clone(), &displayed.criteria, favorites);
        }
        displayed.outcome.clone()
    }

    pub fn displayed(&self) -> SearchOutcome {
        self.displayed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .outcome
            .clone()
    }
}
