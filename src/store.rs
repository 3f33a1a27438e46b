use anyhow::Result;
use async_trait::async_trait;

use crate::{database::PropertyRecord, filter::PropertyQuery};

/// Read access to the listing collection.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Returns every record satisfying all predicates of `query`, in the
    /// query's order.
    async fn query(&self, query: &PropertyQuery) -> Result<Vec<PropertyRecord>>;

    /// Fails when no record has the given id.
    async fn get_by_id(&self, id: &str) -> Result<PropertyRecord>;
}
