use crate::ports::outbound::{BulletinStore, PutSummary, SearchResult};
use crate::resolution::domain::{Bulletin, CollectionMeta, CollectionName};
use crate::shared::error::ResolveError;
use crate::shared::ResolveResult;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

/// NopBulletinStore - stand-in used when the cache cannot be opened
///
/// Reads report that no offline data exists; writes report that the cache
/// is unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct NopBulletinStore;

impl NopBulletinStore {
    pub fn new() -> Self {
        Self
    }
}

impl BulletinStore for NopBulletinStore {
    fn get_bulletin(&self, _id: &str) -> ResolveResult<Bulletin> {
        Err(ResolveError::DataMissing)
    }

    fn put_bulletins(
        &self,
        _collection: &CollectionName,
        _bulletins: &[Bulletin],
        _cancel: &CancellationToken,
    ) -> ResolveResult<PutSummary> {
        Err(ResolveError::Unavailable)
    }

    fn search_bulletins(
        &self,
        _query: &str,
        _limit: usize,
        _offset: usize,
    ) -> ResolveResult<SearchResult> {
        Err(ResolveError::DataMissing)
    }

    fn collection_meta(&self) -> ResolveResult<Vec<CollectionMeta>> {
        Err(ResolveError::DataMissing)
    }

    fn last_sync_time(&self, _collection: &CollectionName) -> ResolveResult<Option<DateTime<Utc>>> {
        Err(ResolveError::DataMissing)
    }

    fn purge(&self) -> ResolveResult<()> {
        Err(ResolveError::Unavailable)
    }

    fn close(&self) -> ResolveResult<()> {
        Ok(())
    }
}
