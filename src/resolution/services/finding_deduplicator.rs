use crate::resolution::domain::Finding;
use std::collections::HashSet;

/// Collapses findings sharing the same `vuln_id|component_ref` key,
/// keeping the first occurrence and the original order.
pub fn dedup_findings(findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen = HashSet::with_capacity(findings.len());
    findings
        .into_iter()
        .filter(|finding| seen.insert(finding.dedup_key()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_duplicate_pairs() {
        let mut first = Finding::new("CVE-2021-44228", "log4j-core@2.14.1");
        first.cvss = Some(10.0);
        let findings = vec![
            first,
            Finding::new("CVE-2021-45046", "log4j-core@2.14.1"),
            Finding::new("CVE-2021-44228", "log4j-core@2.14.1"),
            Finding::new("CVE-2021-44228", "log4j-api@2.14.1"),
        ];
        let deduped = dedup_findings(findings);
        assert_eq!(deduped.len(), 3);
        assert_eq!(deduped[0].cvss, Some(10.0));
        assert_eq!(deduped[1].vuln_id, "CVE-2021-45046");
        assert_eq!(deduped[2].component_ref, "log4j-api@2.14.1");
    }
}
