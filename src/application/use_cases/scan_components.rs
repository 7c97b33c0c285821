use crate::application::dto::{ResolutionMode, ScanRequest, ScanResponse, ScanSummary};
use crate::application::use_cases::{
    EnrichFindingsUseCase, MatchComponentsUseCase, ResolveOfflineUseCase,
};
use crate::ports::inbound::VulnerabilityResolutionPort;
use crate::ports::outbound::{BulletinStore, IntelligenceClient, ProgressReporter};
use crate::resolution::domain::{Component, Finding};
use crate::resolution::policies::Policy;
use crate::resolution::services::dedup_findings;
use crate::shared::error::ResolveError;
use crate::shared::ResolveResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// ScanComponentsUseCase - Core use case for a vulnerability scan
///
/// Resolves components online (matcher plus enrichment of external findings)
/// or offline (local cache), then applies the policy and computes the exit
/// code decision and summary.
///
/// # Type Parameters
/// * `C` - IntelligenceClient implementation, required for online scans
/// * `S` - BulletinStore implementation, required for offline scans
/// * `PR` - ProgressReporter implementation
pub struct ScanComponentsUseCase<C, S, PR> {
    client: Option<C>,
    store: Option<S>,
    progress_reporter: PR,
    policy: Policy,
    concurrency: usize,
    ai_score: bool,
}

impl<C, S, PR> ScanComponentsUseCase<C, S, PR>
where
    C: IntelligenceClient + Clone,
    S: BulletinStore + Clone + 'static,
    PR: ProgressReporter,
{
    /// Creates a new ScanComponentsUseCase with injected dependencies
    pub fn new(client: Option<C>, store: Option<S>, progress_reporter: PR, policy: Policy) -> Self {
        Self {
            client,
            store,
            progress_reporter,
            policy,
            concurrency: 1,
            ai_score: false,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_ai_score(mut self, enabled: bool) -> Self {
        self.ai_score = enabled;
        self
    }

    async fn resolve_online(
        &self,
        components: &[Component],
        external_findings: Vec<Finding>,
        cancel: &CancellationToken,
    ) -> ResolveResult<Vec<Finding>> {
        let client = self.client.clone().ok_or_else(|| {
            ResolveError::validation("an API key is required for online scanning")
        })?;

        self.progress_reporter.report(&format!(
            "🔍 Resolving {} component(s) against the intelligence source...",
            components.len()
        ));
        let matcher = MatchComponentsUseCase::new(client.clone()).with_concurrency(self.concurrency);
        let mut findings = matcher
            .match_components_with_progress(
                components,
                cancel,
                Box::new(|done, total| {
                    self.progress_reporter.report_progress(done, total, None)
                }),
            )
            .await?;
        self.progress_reporter
            .report_completion(&format!("✅ Matched {} finding(s)", findings.len()));

        if !external_findings.is_empty() {
            self.progress_reporter.report(&format!(
                "🧩 Enriching {} external finding(s)...",
                external_findings.len()
            ));
            let enricher = EnrichFindingsUseCase::new(client).with_ai_score(self.ai_score);
            findings.extend(enricher.enrich(external_findings, cancel).await);
        }
        Ok(findings)
    }

    async fn resolve_offline(
        &self,
        components: &[Component],
        external_findings: Vec<Finding>,
        cancel: &CancellationToken,
    ) -> ResolveResult<Vec<Finding>> {
        let store = self.store.clone().ok_or(ResolveError::DataMissing)?;

        self.progress_reporter.report(&format!(
            "📦 Resolving {} component(s) against the offline cache...",
            components.len()
        ));
        // SQLite calls block, so keep them off the async workers.
        let owned_components = components.to_vec();
        let owned_cancel = cancel.clone();
        let mut findings = tokio::task::spawn_blocking(move || {
            ResolveOfflineUseCase::new(store).resolve(&owned_components, &owned_cancel)
        })
        .await
        .map_err(|e| ResolveError::upstream("offline resolution", e))??;

        findings.extend(external_findings);
        Ok(dedup_findings(findings))
    }
}

#[async_trait]
impl<C, S, PR> VulnerabilityResolutionPort for ScanComponentsUseCase<C, S, PR>
where
    C: IntelligenceClient + Clone,
    S: BulletinStore + Clone + 'static,
    PR: ProgressReporter,
{
    async fn scan(
        &self,
        request: ScanRequest,
        cancel: &CancellationToken,
    ) -> ResolveResult<ScanResponse> {
        let ScanRequest {
            components,
            external_findings,
            mode,
        } = request;

        let findings = match mode {
            ResolutionMode::Online => {
                self.resolve_online(&components, external_findings, cancel)
                    .await?
            }
            ResolutionMode::Offline => {
                self.resolve_offline(&components, external_findings, cancel)
                    .await?
            }
        };

        let found = findings.len();
        let findings = self.policy.filter(findings);
        let exit_code = self.policy.exit_code(&findings);
        let summary = ScanSummary::from_findings(components.len(), &findings);

        info!(
            components = components.len(),
            found = found,
            actionable = findings.len(),
            exit_code = exit_code.as_i32(),
            "Scan complete"
        );

        Ok(ScanResponse {
            findings,
            exit_code,
            summary,
        })
    }
}
