use crate::application::dto::{ScanRequest, ScanResponse};
use crate::shared::ResolveResult;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// VulnerabilityResolutionPort - Inbound port for the scan use case
///
/// This port defines the interface that external adapters (CLI, server
/// handlers) use to resolve components into a policy-gated verdict.
#[async_trait]
pub trait VulnerabilityResolutionPort: Send + Sync {
    /// Resolves the request's components and applies the policy
    ///
    /// # Arguments
    /// * `request` - Components, external findings and resolution mode
    /// * `cancel` - Token that aborts the scan when fired
    ///
    /// # Returns
    /// Actionable findings, the exit code decision and summary counts
    ///
    /// # Errors
    /// Returns an error if:
    /// - The scan was canceled
    /// - Every online lookup failed
    /// - Offline mode is requested but nothing has been synced
    /// - Online mode is requested without an intelligence client
    async fn scan(
        &self,
        request: ScanRequest,
        cancel: &CancellationToken,
    ) -> ResolveResult<ScanResponse>;
}
