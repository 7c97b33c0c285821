use crate::ports::outbound::BulletinStore;
use crate::resolution::domain::{Component, Finding};
use crate::resolution::services::{dedup_findings, FindingConverter};
use crate::shared::cancel::ensure_not_canceled;
use crate::shared::error::ResolveError;
use crate::shared::ResolveResult;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Maximum number of cached bulletins considered per component.
pub const OFFLINE_SEARCH_LIMIT: usize = 100;

/// ResolveOfflineUseCase - resolves components against the local cache
///
/// # Type Parameters
/// * `S` - BulletinStore implementation
pub struct ResolveOfflineUseCase<S: BulletinStore> {
    store: S,
}

impl<S: BulletinStore> ResolveOfflineUseCase<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Searches the cache for each component and converts the hits
    ///
    /// Results are deduplicated by `vuln_id|component_ref`, keeping the
    /// first occurrence.
    ///
    /// # Errors
    /// - `ResolveError::DataMissing` when nothing has been synced, so an
    ///   empty cache is never mistaken for a clean result
    /// - `ResolveError::Canceled` when the token fires between components
    /// - `ResolveError::AllLookupsFailed` when every cache search failed
    /// - Store errors from reading the collection metadata, unchanged
    pub fn resolve(
        &self,
        components: &[Component],
        cancel: &CancellationToken,
    ) -> ResolveResult<Vec<Finding>> {
        let metas = self.store.collection_meta()?;
        if metas.is_empty() {
            return Err(ResolveError::DataMissing);
        }
        debug!(collections = metas.len(), "Offline data available");

        let mut findings = Vec::new();
        let mut attempted = 0usize;
        let mut failed = 0usize;
        for component in components.iter().map(Component::normalized) {
            if !component.is_resolvable() {
                continue;
            }
            ensure_not_canceled(cancel)?;

            let query = format!("{} {}", component.name, component.version);
            let component_ref = component.component_ref();
            attempted += 1;
            match self.store.search_bulletins(&query, OFFLINE_SEARCH_LIMIT, 0) {
                Ok(page) => findings.extend(
                    page.bulletins
                        .iter()
                        .map(|b| FindingConverter::from_bulletin(b, &component_ref)),
                ),
                Err(e) => {
                    failed += 1;
                    warn!(component = %component_ref, error = %e, "Offline search failed");
                }
            }
        }
        if attempted > 0 && failed == attempted {
            return Err(ResolveError::AllLookupsFailed { attempted });
        }

        Ok(dedup_findings(findings))
    }
}
