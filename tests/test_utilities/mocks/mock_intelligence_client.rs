use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use vulngate::prelude::*;

/// Mock IntelligenceClient with canned responses and a call log.
///
/// Search results are keyed by a needle: any query containing the needle
/// returns those bulletins. Every call is appended to a shared log as
/// `"<operation>:<argument>"` so tests can assert what was (not) requested.
#[derive(Default, Clone)]
pub struct MockIntelligenceClient {
    search_results: Vec<(String, Vec<Bulletin>)>,
    failing_searches: HashSet<String>,
    fail_all_searches: bool,
    bulletins: HashMap<String, Bulletin>,
    batch_failure: bool,
    archives: HashMap<String, Vec<Bulletin>>,
    updates: HashMap<String, Vec<Bulletin>>,
    update_failure: bool,
    ai_scores: HashMap<String, f64>,
    cancel_after: Option<(usize, CancellationToken)>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockIntelligenceClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_result(mut self, needle: &str, bulletins: Vec<Bulletin>) -> Self {
        self.search_results.push((needle.to_string(), bulletins));
        self
    }

    pub fn with_failing_search(mut self, needle: &str) -> Self {
        self.failing_searches.insert(needle.to_string());
        self
    }

    pub fn with_all_searches_failing(mut self) -> Self {
        self.fail_all_searches = true;
        self
    }

    pub fn with_bulletin(mut self, bulletin: Bulletin) -> Self {
        self.bulletins.insert(bulletin.id.clone(), bulletin);
        self
    }

    pub fn with_batch_failure(mut self) -> Self {
        self.batch_failure = true;
        self
    }

    pub fn with_archive(mut self, collection: &str, bulletins: Vec<Bulletin>) -> Self {
        self.archives.insert(collection.to_string(), bulletins);
        self
    }

    pub fn with_update(mut self, collection: &str, bulletins: Vec<Bulletin>) -> Self {
        self.updates.insert(collection.to_string(), bulletins);
        self
    }

    pub fn with_update_failure(mut self) -> Self {
        self.update_failure = true;
        self
    }

    pub fn with_ai_score(mut self, id: &str, score: f64) -> Self {
        self.ai_scores.insert(id.to_string(), score);
        self
    }

    /// Cancels `token` once `calls` requests have been made, simulating an
    /// interrupt that arrives while the last of them is in flight.
    pub fn with_cancel_after(mut self, calls: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((calls, token));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_starting_with(&self, operation: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.starts_with(operation))
            .collect()
    }

    fn record(&self, call: String) {
        let count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(call);
            calls.len()
        };
        if let Some((limit, token)) = &self.cancel_after {
            if count >= *limit {
                token.cancel();
            }
        }
    }
}

#[async_trait]
impl IntelligenceClient for MockIntelligenceClient {
    async fn search(&self, query: &str, _limit: usize, _offset: usize) -> ResolveResult<SearchResult> {
        self.record(format!("search:{}", query));

        if self.fail_all_searches || self.failing_searches.iter().any(|n| query.contains(n.as_str())) {
            return Err(ResolveError::upstream("search", "mock search failure"));
        }

        let bulletins: Vec<Bulletin> = self
            .search_results
            .iter()
            .filter(|(needle, _)| query.contains(needle.as_str()))
            .flat_map(|(_, bulletins)| bulletins.iter().cloned())
            .collect();
        Ok(SearchResult {
            total: bulletins.len() as u64,
            bulletins,
        })
    }

    async fn get_bulletin(&self, id: &str) -> ResolveResult<Bulletin> {
        self.record(format!("get:{}", id));
        self.bulletins
            .get(id)
            .cloned()
            .ok_or_else(|| ResolveError::NotFound { id: id.to_string() })
    }

    async fn get_multiple_bulletins(&self, ids: &[String]) -> ResolveResult<HashMap<String, Bulletin>> {
        self.record(format!("batch:{}", ids.join(",")));
        if self.batch_failure {
            return Err(ResolveError::upstream("get_multiple_bulletins", "mock batch failure"));
        }
        Ok(ids
            .iter()
            .filter_map(|id| self.bulletins.get(id).map(|b| (id.clone(), b.clone())))
            .collect())
    }

    async fn fetch_collection(&self, collection: &CollectionName) -> ResolveResult<Vec<Bulletin>> {
        self.record(format!("full:{}", collection));
        self.archives.get(collection.as_str()).cloned().ok_or_else(|| {
            ResolveError::upstream("fetch_collection", "mock archive missing")
        })
    }

    async fn fetch_collection_update(
        &self,
        collection: &CollectionName,
        _after: DateTime<Utc>,
    ) -> ResolveResult<Vec<Bulletin>> {
        self.record(format!("delta:{}", collection));
        if self.update_failure {
            return Err(ResolveError::upstream("fetch_collection_update", "mock update failure"));
        }
        Ok(self.updates.get(collection.as_str()).cloned().unwrap_or_default())
    }

    async fn ai_score(&self, text: &str) -> ResolveResult<Option<f64>> {
        self.record(format!("ai:{}", text));
        Ok(self.ai_scores.get(text).copied())
    }
}
