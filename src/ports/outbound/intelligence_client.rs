use crate::resolution::domain::{Bulletin, CollectionName};
use crate::shared::ResolveResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

/// One page of bulletins plus the total number of matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    pub total: u64,
    pub bulletins: Vec<Bulletin>,
}

/// IntelligenceClient port for the remote vulnerability intelligence source
///
/// Abstracts the search, lookup, bulk archive and AI scoring endpoints.
/// Implementations must be `Send + Sync` so use cases can resolve several
/// components concurrently. Cancellation is applied by callers, which race
/// every call against their token.
#[async_trait]
pub trait IntelligenceClient: Send + Sync {
    /// Runs a search query and returns one page of results.
    ///
    /// # Errors
    /// Returns `ResolveError::Upstream` when the request or the response fails.
    async fn search(&self, query: &str, limit: usize, offset: usize)
        -> ResolveResult<SearchResult>;

    /// Fetches a single bulletin by id.
    ///
    /// # Errors
    /// Returns `ResolveError::NotFound` if the id is unknown upstream.
    async fn get_bulletin(&self, id: &str) -> ResolveResult<Bulletin>;

    /// Fetches several bulletins in one request. Unknown ids are absent
    /// from the returned map.
    async fn get_multiple_bulletins(&self, ids: &[String])
        -> ResolveResult<HashMap<String, Bulletin>>;

    /// Downloads the complete archive of a collection.
    async fn fetch_collection(&self, collection: &CollectionName) -> ResolveResult<Vec<Bulletin>>;

    /// Downloads bulletins of a collection changed after `after`.
    async fn fetch_collection_update(
        &self,
        collection: &CollectionName,
        after: DateTime<Utc>,
    ) -> ResolveResult<Vec<Bulletin>>;

    /// Scores free text (typically a vulnerability id). `None` when the
    /// source has no score for it.
    async fn ai_score(&self, text: &str) -> ResolveResult<Option<f64>>;
}

#[async_trait]
impl<T: IntelligenceClient + ?Sized> IntelligenceClient for Arc<T> {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> ResolveResult<SearchResult> {
        (**self).search(query, limit, offset).await
    }

    async fn get_bulletin(&self, id: &str) -> ResolveResult<Bulletin> {
        (**self).get_bulletin(id).await
    }

    async fn get_multiple_bulletins(
        &self,
        ids: &[String],
    ) -> ResolveResult<HashMap<String, Bulletin>> {
        (**self).get_multiple_bulletins(ids).await
    }

    async fn fetch_collection(&self, collection: &CollectionName) -> ResolveResult<Vec<Bulletin>> {
        (**self).fetch_collection(collection).await
    }

    async fn fetch_collection_update(
        &self,
        collection: &CollectionName,
        after: DateTime<Utc>,
    ) -> ResolveResult<Vec<Bulletin>> {
        (**self).fetch_collection_update(collection, after).await
    }

    async fn ai_score(&self, text: &str) -> ResolveResult<Option<f64>> {
        (**self).ai_score(text).await
    }
}
