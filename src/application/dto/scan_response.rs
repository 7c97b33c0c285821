use crate::resolution::domain::{Finding, Severity};
use crate::shared::error::ExitCode;
use serde::Serialize;

/// EPSS probability from which a finding counts as likely to be exploited.
pub const HIGH_EPSS_THRESHOLD: f64 = 0.1;

/// Aggregate counts over the actionable findings of a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    pub component_count: usize,
    pub finding_count: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub exploited_count: usize,
    #[serde(rename = "highEPSSCount")]
    pub high_epss_count: usize,
}

impl ScanSummary {
    pub fn from_findings(component_count: usize, findings: &[Finding]) -> Self {
        let mut summary = Self {
            component_count,
            finding_count: findings.len(),
            ..Default::default()
        };
        for finding in findings {
            match finding.severity {
                Severity::Critical => summary.critical += 1,
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
                Severity::None | Severity::Unknown => {}
            }
            if finding.has_exploit || finding.wild_exploited {
                summary.exploited_count += 1;
            }
            if finding.epss.is_some_and(|epss| epss >= HIGH_EPSS_THRESHOLD) {
                summary.high_epss_count += 1;
            }
        }
        summary
    }
}

/// ScanResponse - Internal response DTO from the scan use case
///
/// Findings are already filtered by policy. The exit code is a decision
/// only; the caller decides whether to terminate the process with it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub findings: Vec<Finding>,
    pub exit_code: ExitCode,
    pub summary: ScanSummary,
}
