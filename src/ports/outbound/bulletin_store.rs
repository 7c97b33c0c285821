use super::intelligence_client::SearchResult;
use crate::resolution::domain::{Bulletin, CollectionMeta, CollectionName};
use crate::shared::ResolveResult;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Outcome of a bulk write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutSummary {
    pub stored: usize,
    pub skipped: usize,
}

/// BulletinStore port for the local offline cache
///
/// Holds bulletins keyed by id together with per-collection sync
/// bookkeeping. Every write is transactional: a collection's stored count
/// and sync time are updated in the same transaction as its rows.
pub trait BulletinStore: Send + Sync {
    /// # Errors
    /// `NotFound` when the id is not cached.
    fn get_bulletin(&self, id: &str) -> ResolveResult<Bulletin>;

    /// Upserts bulletins into `collection`. Malformed bulletins are skipped.
    /// A cancellation mid-write rolls the transaction back and returns
    /// `Canceled`.
    fn put_bulletins(
        &self,
        collection: &CollectionName,
        bulletins: &[Bulletin],
        cancel: &CancellationToken,
    ) -> ResolveResult<PutSummary>;

    /// Substring search over bulletin id and title, ordered by id.
    fn search_bulletins(&self, query: &str, limit: usize, offset: usize)
        -> ResolveResult<SearchResult>;

    fn collection_meta(&self) -> ResolveResult<Vec<CollectionMeta>>;

    /// `None` when the collection was never synced.
    fn last_sync_time(&self, collection: &CollectionName) -> ResolveResult<Option<DateTime<Utc>>>;

    /// Removes every bulletin and all sync bookkeeping.
    fn purge(&self) -> ResolveResult<()>;

    /// Releases the underlying resources. Later calls fail with `Unavailable`.
    fn close(&self) -> ResolveResult<()>;
}

macro_rules! forward_bulletin_store {
    ($wrapper:ty) => {
        impl<T: BulletinStore + ?Sized> BulletinStore for $wrapper {
            fn get_bulletin(&self, id: &str) -> ResolveResult<Bulletin> {
                (**self).get_bulletin(id)
            }

            fn put_bulletins(
                &self,
                collection: &CollectionName,
                bulletins: &[Bulletin],
                cancel: &CancellationToken,
            ) -> ResolveResult<PutSummary> {
                (**self).put_bulletins(collection, bulletins, cancel)
            }

            fn search_bulletins(
                &self,
                query: &str,
                limit: usize,
                offset: usize,
            ) -> ResolveResult<SearchResult> {
                (**self).search_bulletins(query, limit, offset)
            }

            fn collection_meta(&self) -> ResolveResult<Vec<CollectionMeta>> {
                (**self).collection_meta()
            }

            fn last_sync_time(
                &self,
                collection: &CollectionName,
            ) -> ResolveResult<Option<DateTime<Utc>>> {
                (**self).last_sync_time(collection)
            }

            fn purge(&self) -> ResolveResult<()> {
                (**self).purge()
            }

            fn close(&self) -> ResolveResult<()> {
                (**self).close()
            }
        }
    };
}

forward_bulletin_store!(Box<T>);
forward_bulletin_store!(Arc<T>);
