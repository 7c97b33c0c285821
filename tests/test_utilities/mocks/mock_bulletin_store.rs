use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use vulngate::ports::outbound::PutSummary;
use vulngate::prelude::*;

/// Mock BulletinStore that reports synced collections but fails every
/// search, like a cache whose bulletin table became unreadable.
#[derive(Default, Clone)]
pub struct MockBulletinStore {
    metas: Vec<CollectionMeta>,
}

impl MockBulletinStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_synced_collection(mut self, collection: &str, count: u64) -> Self {
        self.metas.push(CollectionMeta {
            collection: collection.to_string(),
            count,
            synced_at: Some(Utc::now()),
        });
        self
    }

    fn broken(operation: &str) -> ResolveError {
        ResolveError::upstream(operation, "mock store failure")
    }
}

impl BulletinStore for MockBulletinStore {
    fn get_bulletin(&self, _id: &str) -> ResolveResult<Bulletin> {
        Err(Self::broken("get_bulletin"))
    }

    fn put_bulletins(
        &self,
        _collection: &CollectionName,
        _bulletins: &[Bulletin],
        _cancel: &CancellationToken,
    ) -> ResolveResult<PutSummary> {
        Err(Self::broken("put_bulletins"))
    }

    fn search_bulletins(&self, _query: &str, _limit: usize, _offset: usize) -> ResolveResult<SearchResult> {
        Err(Self::broken("search_bulletins"))
    }

    fn collection_meta(&self) -> ResolveResult<Vec<CollectionMeta>> {
        Ok(self.metas.clone())
    }

    fn last_sync_time(&self, collection: &CollectionName) -> ResolveResult<Option<DateTime<Utc>>> {
        Ok(self
            .metas
            .iter()
            .find(|m| m.collection == collection.as_str())
            .and_then(|m| m.synced_at))
    }

    fn purge(&self) -> ResolveResult<()> {
        Ok(())
    }

    fn close(&self) -> ResolveResult<()> {
        Ok(())
    }
}
