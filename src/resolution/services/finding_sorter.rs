use crate::resolution::domain::Finding;
use std::cmp::Ordering;

/// Sorts findings deterministically: severity descending, then
/// vulnerability id, then component reference.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(compare);
}

fn compare(a: &Finding, b: &Finding) -> Ordering {
    b.severity
        .rank()
        .cmp(&a.severity.rank())
        .then_with(|| a.vuln_id.cmp(&b.vuln_id))
        .then_with(|| a.component_ref.cmp(&b.component_ref))
}
