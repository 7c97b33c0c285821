use crate::resolution::domain::{Bulletin, Finding, Severity};

/// FindingConverter - maps a bulletin onto a finding for one component
pub struct FindingConverter;

impl FindingConverter {
    /// Converts a bulletin into a finding attributed to `component_ref`.
    ///
    /// Severity comes from the best CVSS score (v3 preferred). A bulletin
    /// with no score at all yields `Severity::Unknown`. References fall back
    /// to the bulletin's own link when the reference list is empty.
    pub fn from_bulletin(bulletin: &Bulletin, component_ref: &str) -> Finding {
        let cvss = bulletin.best_cvss();
        let severity = match cvss {
            Some(score) => Severity::from_cvss_score(score),
            None if bulletin.cvss.is_some() || bulletin.cvss3.is_some() => Severity::None,
            None => Severity::Unknown,
        };

        let references = if !bulletin.references.is_empty() {
            bulletin.references.clone()
        } else {
            bulletin.href.iter().cloned().collect()
        };

        Finding {
            vuln_id: bulletin.id.clone(),
            aliases: bulletin
                .cve_list
                .iter()
                .filter(|cve| **cve != bulletin.id)
                .cloned()
                .collect(),
            severity,
            cvss,
            epss: bulletin
                .epss
                .first()
                .map(|entry| entry.epss)
                .filter(|epss| *epss > 0.0),
            ai_score: bulletin.ai.as_ref().map(|ai| ai.value),
            has_exploit: bulletin.is_exploit(),
            wild_exploited: bulletin.is_wild_exploited(),
            component_ref: component_ref.to_string(),
            fix: None,
            references,
            reachability: None,
        }
    }
}
