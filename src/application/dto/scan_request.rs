use crate::resolution::domain::{Component, Finding};

/// Where vulnerability data comes from for a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionMode {
    /// Query the remote intelligence source
    #[default]
    Online,
    /// Search the local cache populated by `offline sync`
    Offline,
}

/// ScanRequest - Internal request DTO for the scan use case
#[derive(Debug, Clone, Default)]
pub struct ScanRequest {
    /// Components produced by an external inventory collector
    pub components: Vec<Component>,
    /// Findings reported by an external analyzer, enriched in online mode
    pub external_findings: Vec<Finding>,
    pub mode: ResolutionMode,
}

impl ScanRequest {
    pub fn new(components: Vec<Component>, mode: ResolutionMode) -> Self {
        Self {
            components,
            external_findings: Vec::new(),
            mode,
        }
    }

    pub fn with_external_findings(mut self, findings: Vec<Finding>) -> Self {
        self.external_findings = findings;
        self
    }
}
