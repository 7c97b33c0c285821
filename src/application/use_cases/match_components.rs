use crate::ports::outbound::{IntelligenceClient, ProgressCallback};
use crate::resolution::domain::{Component, Finding};
use crate::resolution::services::{sort_findings, FindingConverter, LuceneQueryBuilder, QueryBuilder};
use crate::shared::cancel::cancellable;
use crate::shared::error::ResolveError;
use crate::shared::ResolveResult;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Maximum number of bulletins fetched per component.
pub const SEARCH_LIMIT: usize = 100;

struct Lookup {
    component_ref: String,
    query: String,
}

/// MatchComponentsUseCase - resolves components against the intelligence source
///
/// Each resolvable component becomes one search query. A failing lookup is
/// logged and skipped; the operation only fails when it is canceled or when
/// every attempted lookup failed.
///
/// # Type Parameters
/// * `C` - IntelligenceClient implementation
pub struct MatchComponentsUseCase<C: IntelligenceClient> {
    client: C,
    query_builder: Box<dyn QueryBuilder>,
    concurrency: usize,
}

impl<C: IntelligenceClient> MatchComponentsUseCase<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            query_builder: Box::new(LuceneQueryBuilder::default()),
            concurrency: 1,
        }
    }

    pub fn with_query_builder(mut self, query_builder: impl QueryBuilder + 'static) -> Self {
        self.query_builder = Box::new(query_builder);
        self
    }

    /// Resolves up to `concurrency` components at once. Zero is treated as one.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub async fn match_components(
        &self,
        components: &[Component],
        cancel: &CancellationToken,
    ) -> ResolveResult<Vec<Finding>> {
        self.match_components_with_progress(components, cancel, Box::new(|_, _| {}))
            .await
    }

    /// Resolves components, reporting `(done, total)` after each lookup
    ///
    /// # Errors
    /// - `ResolveError::Canceled` as soon as the token fires; no further
    ///   queries are issued and in-flight ones are dropped
    /// - `ResolveError::AllLookupsFailed` when every attempted lookup failed
    pub async fn match_components_with_progress(
        &self,
        components: &[Component],
        cancel: &CancellationToken,
        progress: ProgressCallback<'_>,
    ) -> ResolveResult<Vec<Finding>> {
        let lookups = self.plan_lookups(components);
        let attempted = lookups.len();
        let client = &self.client;

        let mut results = stream::iter(lookups)
            .map(|lookup| async move {
                debug!(component = %lookup.component_ref, "Querying intelligence source");
                let result = cancellable(cancel, client.search(&lookup.query, SEARCH_LIMIT, 0)).await;
                (lookup, result)
            })
            .buffer_unordered(self.concurrency);

        let mut findings = Vec::new();
        let mut failed = 0;
        let mut done = 0;

        while let Some((lookup, result)) = results.next().await {
            done += 1;
            match result {
                Ok(page) => {
                    findings.extend(
                        page.bulletins
                            .iter()
                            .map(|b| FindingConverter::from_bulletin(b, &lookup.component_ref)),
                    );
                }
                Err(e) if e.is_canceled() || cancel.is_cancelled() => {
                    debug!(completed = done - 1, total = attempted, "Matching canceled");
                    return Err(ResolveError::Canceled);
                }
                Err(e) => {
                    warn!(
                        component = %lookup.component_ref,
                        error = %e,
                        "Search failed for component"
                    );
                    failed += 1;
                }
            }
            progress(done, attempted);
        }

        if failed > 0 {
            warn!(
                skipped = failed,
                total = attempted,
                "Components skipped due to search errors"
            );
        }
        if attempted > 0 && failed == attempted {
            return Err(ResolveError::AllLookupsFailed { attempted });
        }

        if self.concurrency > 1 {
            sort_findings(&mut findings);
        }
        Ok(findings)
    }

    fn plan_lookups(&self, components: &[Component]) -> Vec<Lookup> {
        components
            .iter()
            .map(Component::normalized)
            .filter(Component::is_resolvable)
            .filter_map(|component| {
                let query = self.query_builder.build(&component)?;
                Some(Lookup {
                    component_ref: component.component_ref(),
                    query,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::SearchResult;
    use crate::resolution::domain::{Bulletin, CollectionName};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct RecordingClient {
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl IntelligenceClient for RecordingClient {
        async fn search(&self, query: &str, _: usize, _: usize) -> ResolveResult<SearchResult> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(SearchResult {
                total: 1,
                bulletins: vec![Bulletin::new("CVE-2023-0001", "x")],
            })
        }
        async fn get_bulletin(&self, id: &str) -> ResolveResult<Bulletin> {
            Err(ResolveError::NotFound { id: id.to_string() })
        }
        async fn get_multiple_bulletins(&self, _: &[String]) -> ResolveResult<HashMap<String, Bulletin>> {
            Ok(HashMap::new())
        }
        async fn fetch_collection(&self, _: &CollectionName) -> ResolveResult<Vec<Bulletin>> {
            Ok(Vec::new())
        }
        async fn fetch_collection_update(&self, _: &CollectionName, _: DateTime<Utc>) -> ResolveResult<Vec<Bulletin>> {
            Ok(Vec::new())
        }
        async fn ai_score(&self, _: &str) -> ResolveResult<Option<f64>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_exact_only_query_builder() {
        let client = RecordingClient {
            queries: Mutex::new(Vec::new()),
        };
        let use_case =
            MatchComponentsUseCase::new(client).with_query_builder(LuceneQueryBuilder::exact_only());
        let findings = use_case
            .match_components(
                &[Component::new("npm", " Lodash ", "4.17.20")],
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(findings[0].component_ref, "lodash@4.17.20");
        let queries = use_case.client.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(
            queries[0],
            "affectedSoftware.name:\"lodash\" AND affectedSoftware.version:\"4.17.20\""
        );
    }

    #[test]
    fn test_concurrency_floor() {
        let client = RecordingClient {
            queries: Mutex::new(Vec::new()),
        };
        let use_case = MatchComponentsUseCase::new(client).with_concurrency(0);
        assert_eq!(use_case.concurrency, 1);
    }
}
