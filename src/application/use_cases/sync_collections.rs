use crate::ports::outbound::{BulletinStore, IntelligenceClient};
use crate::resolution::domain::{Bulletin, CollectionName};
use crate::resolution::policies::{default_delta_threshold, SyncMode, SyncPlan};
use crate::shared::cancel::{cancellable, ensure_not_canceled};
use crate::shared::ResolveResult;
use chrono::{Duration, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Result of syncing one collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    pub collection: CollectionName,
    pub mode: SyncMode,
    pub fetched: usize,
    pub stored: usize,
    pub skipped: usize,
}

/// SyncCollectionsUseCase - refreshes the offline cache from the intelligence source
///
/// Each collection is brought up to date with a delta fetch when the last
/// sync is recent, otherwise with a full archive download.
///
/// # Type Parameters
/// * `C` - IntelligenceClient implementation
/// * `S` - BulletinStore implementation
pub struct SyncCollectionsUseCase<C: IntelligenceClient, S: BulletinStore> {
    client: C,
    store: S,
    delta_threshold: Duration,
}

impl<C: IntelligenceClient, S: BulletinStore> SyncCollectionsUseCase<C, S> {
    pub fn new(client: C, store: S) -> Self {
        Self {
            client,
            store,
            delta_threshold: default_delta_threshold(),
        }
    }

    pub fn with_delta_threshold(mut self, threshold: Duration) -> Self {
        self.delta_threshold = threshold;
        self
    }

    /// Syncs each collection in order
    ///
    /// A delta fetch that fails for any reason other than cancellation is
    /// retried once as a full fetch.
    ///
    /// # Errors
    /// - `ResolveError::Canceled` if the token fires; no fallback is tried
    /// - `ResolveError::Upstream` if a full fetch fails
    /// - any store error from persisting the bulletins
    pub async fn sync(
        &self,
        collections: &[CollectionName],
        force_full: bool,
        cancel: &CancellationToken,
    ) -> ResolveResult<Vec<SyncOutcome>> {
        let mut outcomes = Vec::with_capacity(collections.len());

        for collection in collections {
            ensure_not_canceled(cancel)?;

            let last_sync = self.store.last_sync_time(collection).unwrap_or_else(|e| {
                warn!(
                    collection = %collection,
                    error = %e,
                    "Could not read last sync time, treating as never synced"
                );
                None
            });
            let plan = SyncPlan::decide(force_full, last_sync, Utc::now(), self.delta_threshold);
            let (mode, bulletins) = self.fetch(collection, plan, cancel).await?;

            info!(collection = %collection, count = bulletins.len(), "Storing bulletins");
            let summary = self.store.put_bulletins(collection, &bulletins, cancel)?;

            outcomes.push(SyncOutcome {
                collection: collection.clone(),
                mode,
                fetched: bulletins.len(),
                stored: summary.stored,
                skipped: summary.skipped,
            });
        }

        info!(collections = outcomes.len(), "Sync complete");
        Ok(outcomes)
    }

    async fn fetch(
        &self,
        collection: &CollectionName,
        plan: SyncPlan,
        cancel: &CancellationToken,
    ) -> ResolveResult<(SyncMode, Vec<Bulletin>)> {
        if let (SyncMode::Delta, Some(since)) = (plan.mode, plan.since) {
            info!(collection = %collection, since = %since.to_rfc3339(), "Incremental sync");
            match cancellable(cancel, self.client.fetch_collection_update(collection, since)).await
            {
                Ok(bulletins) => return Ok((SyncMode::Delta, bulletins)),
                Err(e) if e.is_canceled() => return Err(e),
                Err(e) => warn!(
                    collection = %collection,
                    error = %e,
                    "Delta sync failed, falling back to full sync"
                ),
            }
        } else {
            info!(collection = %collection, "Full sync");
        }

        let bulletins = cancellable(cancel, self.client.fetch_collection(collection)).await?;
        Ok((SyncMode::Full, bulletins))
    }
}
