use super::suppression::SuppressionMap;
use crate::resolution::domain::{Finding, Severity};
use crate::shared::error::ExitCode;
use std::collections::HashSet;

/// Policy - decides which findings are actionable and the resulting verdict
///
/// Built per invocation from configuration: an optional severity threshold,
/// ids to ignore, and exploitability statuses from a suppression document.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    fail_on: Option<Severity>,
    ignore_ids: HashSet<String>,
    suppressions: SuppressionMap,
}

impl Policy {
    pub fn new(fail_on: Option<Severity>, ignore_ids: impl IntoIterator<Item = String>) -> Self {
        Self {
            fail_on,
            ignore_ids: ignore_ids.into_iter().collect(),
            suppressions: SuppressionMap::default(),
        }
    }

    pub fn with_suppressions(mut self, suppressions: SuppressionMap) -> Self {
        self.suppressions = suppressions;
        self
    }

    pub fn fail_on(&self) -> Option<Severity> {
        self.fail_on
    }

    /// Removes ignored and suppressed findings, preserving order.
    pub fn filter(&self, findings: Vec<Finding>) -> Vec<Finding> {
        findings
            .into_iter()
            .filter(|finding| !self.is_ignored(finding) && !self.is_suppressed(finding))
            .collect()
    }

    fn is_ignored(&self, finding: &Finding) -> bool {
        finding.all_ids().any(|id| self.ignore_ids.contains(id))
    }

    // A status on the primary id is authoritative; aliases are consulted
    // only when the primary id has none.
    fn is_suppressed(&self, finding: &Finding) -> bool {
        if self.suppressions.is_empty() {
            return false;
        }
        if let Some(status) = self.suppressions.status(&finding.vuln_id) {
            return status.suppresses();
        }
        finding
            .aliases
            .iter()
            .filter_map(|alias| self.suppressions.status(alias))
            .any(|status| status.suppresses())
    }

    /// `VulnerabilitiesDetected` when any finding reaches the threshold.
    pub fn exit_code(&self, findings: &[Finding]) -> ExitCode {
        let Some(threshold) = self.fail_on else {
            return ExitCode::Success;
        };
        if findings
            .iter()
            .any(|finding| finding.severity.rank() >= threshold.rank())
        {
            ExitCode::VulnerabilitiesDetected
        } else {
            ExitCode::Success
        }
    }
}
