use crate::ports::outbound::{IntelligenceClient, SearchResult};
use crate::resolution::domain::{Bulletin, CollectionName};
use crate::shared::error::ResolveError;
use crate::shared::ResolveResult;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Vulners API client
///
/// Implements the IntelligenceClient port over the Vulners REST API.
///
/// # Security
/// - The API key travels in the `X-Api-Key` header, never in URLs
/// - Implements timeout (120 seconds)
/// - Does not retry failed requests; callers decide on fallbacks
#[derive(Clone)]
pub struct VulnersClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl VulnersClient {
    const DEFAULT_BASE_URL: &'static str = "https://vulners.com";
    const TIMEOUT_SECONDS: u64 = 120;
    const API_KEY_HEADER: &'static str = "X-Api-Key";

    /// Creates a client for the public Vulners endpoint
    ///
    /// # Arguments
    /// * `api_key` - Vulners API key
    /// * `version` - Client version reported in the user agent
    ///
    /// # Errors
    /// Returns `ResolveError::Validation` for an empty API key and
    /// `ResolveError::Upstream` if the HTTP client cannot be built.
    pub fn new(api_key: &str, version: &str) -> ResolveResult<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ResolveError::validation(
                "an API key is required for the Vulners client",
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(Self::TIMEOUT_SECONDS))
            .user_agent(format!("vulngate/{}", version))
            .build()
            .map_err(|e| ResolveError::upstream("building HTTP client", e))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Points the client at another deployment (mirror, proxy, test server).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn collection_url(&self, collection: &CollectionName) -> String {
        format!(
            "{}?type={}",
            self.url("/api/v4/archive/collection/"),
            urlencoding::encode(collection.as_str())
        )
    }

    fn collection_update_url(&self, collection: &CollectionName, after: DateTime<Utc>) -> String {
        let after = after.to_rfc3339_opts(SecondsFormat::Secs, true);
        format!(
            "{}?type={}&after={}",
            self.url("/api/v4/archive/collection-update/"),
            urlencoding::encode(collection.as_str()),
            urlencoding::encode(&after)
        )
    }

    /// POSTs a JSON body and unwraps the `{result, data}` envelope.
    async fn post<B, T>(&self, path: &str, body: &B, operation: &str) -> ResolveResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.url(path))
            .header(Self::API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ResolveError::upstream(operation, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::upstream(
                operation,
                format!("Vulners API returned status code {}", status),
            ));
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| ResolveError::upstream(operation, e))?;
        envelope.into_data(operation)
    }

    /// GETs an archive endpoint returning a JSON list of bulletins.
    async fn get_archive(&self, url: String, operation: &str) -> ResolveResult<Vec<Bulletin>> {
        debug!(operation = %operation, "Downloading collection archive");
        let response = self
            .client
            .get(url)
            .header(Self::API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| ResolveError::upstream(operation, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolveError::upstream(
                operation,
                format!("Vulners API returned status code {}", status),
            ));
        }

        let entries: Vec<ArchiveEntry> = response
            .json()
            .await
            .map_err(|e| ResolveError::upstream(operation, e))?;
        Ok(entries.into_iter().map(ArchiveEntry::into_bulletin).collect())
    }
}

#[async_trait]
impl IntelligenceClient for VulnersClient {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> ResolveResult<SearchResult> {
        let request = SearchRequest {
            query,
            skip: offset,
            size: limit,
        };
        let data: SearchData = self
            .post("/api/v3/search/lucene/", &request, "searching bulletins")
            .await?;
        Ok(SearchResult {
            total: data.total,
            bulletins: data.search.into_iter().map(|hit| hit.source).collect(),
        })
    }

    async fn get_bulletin(&self, id: &str) -> ResolveResult<Bulletin> {
        let ids = [id.to_string()];
        let mut documents = self.get_multiple_bulletins(&ids).await?;
        documents
            .remove(id)
            .ok_or_else(|| ResolveError::NotFound { id: id.to_string() })
    }

    async fn get_multiple_bulletins(
        &self,
        ids: &[String],
    ) -> ResolveResult<HashMap<String, Bulletin>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let request = IdRequest { id: ids };
        let data: IdData = self
            .post("/api/v3/search/id/", &request, "fetching bulletins by id")
            .await?;
        Ok(data.documents)
    }

    async fn fetch_collection(&self, collection: &CollectionName) -> ResolveResult<Vec<Bulletin>> {
        let operation = format!("fetching collection {}", collection);
        self.get_archive(self.collection_url(collection), &operation)
            .await
    }

    async fn fetch_collection_update(
        &self,
        collection: &CollectionName,
        after: DateTime<Utc>,
    ) -> ResolveResult<Vec<Bulletin>> {
        let operation = format!("fetching collection update {}", collection);
        self.get_archive(self.collection_update_url(collection, after), &operation)
            .await
    }

    async fn ai_score(&self, text: &str) -> ResolveResult<Option<f64>> {
        let request = AiScoreRequest { text };
        let data: AiScoreData = self
            .post("/api/v3/ai/scoretext/", &request, "scoring text")
            .await?;
        Ok(data.score.value())
    }
}

// Vulners API request/response structures

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: String,
    #[serde(default = "Option::default")]
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

impl<T> Envelope<T> {
    fn into_data(self, operation: &str) -> ResolveResult<T> {
        if !self.result.eq_ignore_ascii_case("OK") {
            let reason = self
                .error
                .unwrap_or_else(|| format!("Vulners API returned result '{}'", self.result));
            return Err(ResolveError::upstream(operation, reason));
        }
        self.data.ok_or_else(|| {
            ResolveError::upstream(operation, "Vulners API response has no data")
        })
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    skip: usize,
    size: usize,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    #[serde(default)]
    search: Vec<SearchHit>,
    #[serde(default)]
    total: u64,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "_source")]
    source: Bulletin,
}

#[derive(Debug, Serialize)]
struct IdRequest<'a> {
    id: &'a [String],
}

#[derive(Debug, Deserialize)]
struct IdData {
    #[serde(default)]
    documents: HashMap<String, Bulletin>,
}

#[derive(Debug, Serialize)]
struct AiScoreRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct AiScoreData {
    #[serde(default)]
    score: AiScoreValue,
}

/// The score arrives either as a bare number or as `[value, unit]`.
#[derive(Debug, Deserialize, Default)]
#[serde(untagged)]
enum AiScoreValue {
    Number(f64),
    Pair(Vec<serde_json::Value>),
    #[default]
    Missing,
}

impl AiScoreValue {
    fn value(&self) -> Option<f64> {
        match self {
            AiScoreValue::Number(value) => Some(*value),
            AiScoreValue::Pair(values) => values.first().and_then(serde_json::Value::as_f64),
            AiScoreValue::Missing => None,
        }
    }
}

/// Archive rows are either search hits wrapping `_source` or bare bulletins.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ArchiveEntry {
    Hit {
        #[serde(rename = "_source")]
        source: Bulletin,
    },
    Plain(Bulletin),
}

impl ArchiveEntry {
    fn into_bulletin(self) -> Bulletin {
        match self {
            ArchiveEntry::Hit { source } => source,
            ArchiveEntry::Plain(bulletin) => bulletin,
        }
    }
}
