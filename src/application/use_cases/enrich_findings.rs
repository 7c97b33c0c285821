use crate::ports::outbound::IntelligenceClient;
use crate::resolution::domain::{Bulletin, Finding, Severity};
use crate::resolution::services::FindingConverter;
use crate::shared::cancel::cancellable;
use std::collections::{HashMap, HashSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Id prefixes the intelligence source can look up directly.
const ENRICHABLE_PREFIXES: [&str; 3] = ["CVE-", "GO-", "GHSA-"];

/// EnrichFindingsUseCase - adds intelligence data to externally reported findings
///
/// Findings already carry a vulnerability id (e.g. from a static analyzer).
/// All candidate ids are fetched in one batch; when the batch fails, each
/// finding is looked up individually. Enrichment never fails: on error or
/// cancellation the findings are returned as far as they got.
///
/// # Type Parameters
/// * `C` - IntelligenceClient implementation
pub struct EnrichFindingsUseCase<C: IntelligenceClient> {
    client: C,
    ai_score: bool,
}

impl<C: IntelligenceClient> EnrichFindingsUseCase<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            ai_score: false,
        }
    }

    /// Also request an AI score for findings that still lack one.
    pub fn with_ai_score(mut self, enabled: bool) -> Self {
        self.ai_score = enabled;
        self
    }

    pub async fn enrich(&self, mut findings: Vec<Finding>, cancel: &CancellationToken) -> Vec<Finding> {
        let candidates: Vec<Vec<String>> = findings.iter().map(candidate_ids).collect();

        let mut seen = HashSet::new();
        let all_ids: Vec<String> = candidates
            .iter()
            .flatten()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        if !all_ids.is_empty() {
            match cancellable(cancel, self.client.get_multiple_bulletins(&all_ids)).await {
                Ok(bulletins) => apply_batch(&mut findings, &candidates, &bulletins),
                Err(e) if e.is_canceled() => return findings,
                Err(e) => {
                    warn!(
                        ids = all_ids.len(),
                        error = %e,
                        "Batch lookup failed, falling back to individual lookups"
                    );
                    if !self.enrich_individually(&mut findings, &candidates, cancel).await {
                        return findings;
                    }
                }
            }
        }

        if self.ai_score {
            self.backfill_ai_scores(&mut findings, cancel).await;
        }
        findings
    }

    /// Returns false when canceled part way through.
    async fn enrich_individually(
        &self,
        findings: &mut [Finding],
        candidates: &[Vec<String>],
        cancel: &CancellationToken,
    ) -> bool {
        for (index, (finding, ids)) in findings.iter_mut().zip(candidates).enumerate() {
            if cancel.is_cancelled() {
                debug!(enriched_so_far = index, "Enrichment canceled");
                return false;
            }
            for id in ids {
                match cancellable(cancel, self.client.get_bulletin(id)).await {
                    Ok(bulletin) => {
                        merge_bulletin(finding, &bulletin);
                        break;
                    }
                    Err(e) if e.is_canceled() => {
                        debug!(enriched_so_far = index, "Enrichment canceled");
                        return false;
                    }
                    Err(e) => debug!(id = %id, error = %e, "Enrichment lookup failed"),
                }
            }
        }
        true
    }

    async fn backfill_ai_scores(&self, findings: &mut [Finding], cancel: &CancellationToken) {
        for finding in findings.iter_mut() {
            if finding.ai_score.is_some() || finding.vuln_id.is_empty() {
                continue;
            }
            if cancel.is_cancelled() {
                return;
            }
            match cancellable(cancel, self.client.ai_score(&finding.vuln_id)).await {
                Ok(score) => finding.ai_score = score,
                Err(e) if e.is_canceled() => return,
                Err(e) => debug!(id = %finding.vuln_id, error = %e, "AI score enrichment failed"),
            }
        }
    }
}

/// Primary id then aliases, restricted to enrichable prefixes, deduplicated.
fn candidate_ids(finding: &Finding) -> Vec<String> {
    if finding.vuln_id.is_empty() {
        return Vec::new();
    }
    let mut seen = HashSet::new();
    finding
        .all_ids()
        .filter(|id| ENRICHABLE_PREFIXES.iter().any(|prefix| id.starts_with(prefix)))
        .filter(|id| seen.insert(*id))
        .map(str::to_string)
        .collect()
}

// Each finding takes the first of its candidates present in the batch.
fn apply_batch(
    findings: &mut [Finding],
    candidates: &[Vec<String>],
    bulletins: &HashMap<String, Bulletin>,
) {
    for (finding, ids) in findings.iter_mut().zip(candidates) {
        if let Some(bulletin) = ids.iter().find_map(|id| bulletins.get(id)) {
            merge_bulletin(finding, bulletin);
        }
    }
}

/// Upgrades a finding with bulletin data. Existing values are never
/// downgraded.
pub(crate) fn merge_bulletin(finding: &mut Finding, bulletin: &Bulletin) {
    let rich = FindingConverter::from_bulletin(bulletin, &finding.component_ref);

    if rich.cvss.is_some() {
        if finding.cvss.is_none() {
            finding.cvss = rich.cvss;
        }
        // A specific severity stands even when it arrived without a score.
        if finding.severity == Severity::Unknown {
            finding.severity = rich.severity;
        }
    }
    finding.has_exploit |= rich.has_exploit;
    finding.wild_exploited |= rich.wild_exploited;

    let own_id = finding.vuln_id.clone();
    let incoming_aliases = bulletin
        .cve_list
        .iter()
        .chain(std::iter::once(&bulletin.id))
        .filter(|id| **id != own_id);
    union_into(&mut finding.aliases, incoming_aliases);
    union_into(&mut finding.references, rich.references.iter());

    if finding.epss.is_none() {
        finding.epss = rich.epss;
    }
    if finding.ai_score.is_none() {
        finding.ai_score = rich.ai_score;
    }
}

fn union_into<'a>(target: &mut Vec<String>, incoming: impl Iterator<Item = &'a String>) {
    let mut seen: HashSet<String> = target.iter().cloned().collect();
    for value in incoming {
        if seen.insert(value.clone()) {
            target.push(value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::domain::bulletin::{CvssMetric, EpssEntry};

    #[test]
    fn test_candidate_ids_filters_and_dedups() {
        let mut finding = Finding::new("GO-2022-0969", "golang.org/x/net@v0.0.1");
        finding.aliases = vec![
            "CVE-2022-27664".to_string(),
            "GHSA-69cg-p879-7622".to_string(),
            "PYSEC-2022-1".to_string(),
            "CVE-2022-27664".to_string(),
        ];
        assert_eq!(
            candidate_ids(&finding),
            vec!["GO-2022-0969", "CVE-2022-27664", "GHSA-69cg-p879-7622"]
        );
    }

    #[test]
    fn test_candidate_ids_empty_primary() {
        let mut finding = Finding::new("", "pkg@1.0.0");
        finding.aliases = vec!["CVE-2022-27664".to_string()];
        assert!(candidate_ids(&finding).is_empty());
    }

    #[test]
    fn test_merge_does_not_downgrade_known_cvss() {
        let mut finding = Finding::new("CVE-2023-0001", "pkg@1.0.0");
        finding.cvss = Some(9.8);
        finding.severity = Severity::Critical;
        finding.epss = Some(0.5);
        finding.has_exploit = true;

        let mut bulletin = Bulletin::new("CVE-2023-0001", "x");
        bulletin.cvss = Some(CvssMetric {
            score: 5.0,
            vector: None,
        });
        bulletin.epss = vec![EpssEntry {
            cve: None,
            epss: 0.01,
            percentile: None,
        }];

        merge_bulletin(&mut finding, &bulletin);
        assert_eq!(finding.cvss, Some(9.8));
        assert_eq!(finding.severity, Severity::Critical);
        assert_eq!(finding.epss, Some(0.5));
        assert!(finding.has_exploit);
    }

    #[test]
    fn test_merge_keeps_specific_severity_without_cvss() {
        let mut finding = Finding::new("CVE-2023-0002", "pkg@1.0.0");
        finding.severity = Severity::High;

        let mut bulletin = Bulletin::new("CVE-2023-0002", "x");
        bulletin.cvss = Some(CvssMetric {
            score: 5.0,
            vector: None,
        });

        merge_bulletin(&mut finding, &bulletin);
        assert_eq!(finding.severity, Severity::High);
        assert_eq!(finding.cvss, Some(5.0));
    }

    #[test]
    fn test_merge_upgrades_unknown_severity() {
        let mut finding = Finding::new("GO-2023-1840", "stdlib@go1.20.4");
        finding.aliases = vec!["CVE-2023-29403".to_string()];
        finding.references = vec!["https://pkg.go.dev/vuln/GO-2023-1840".to_string()];

        let mut bulletin = Bulletin::new("CVE-2023-29403", "setuid");
        bulletin.cvss = Some(CvssMetric {
            score: 7.8,
            vector: None,
        });
        bulletin.cve_list = vec!["CVE-2023-29403".to_string()];
        bulletin.references = vec![
            "https://pkg.go.dev/vuln/GO-2023-1840".to_string(),
            "https://go.dev/issue/60272".to_string(),
        ];

        merge_bulletin(&mut finding, &bulletin);
        assert_eq!(finding.severity, Severity::High);
        assert_eq!(finding.cvss, Some(7.8));
        assert_eq!(finding.aliases, vec!["CVE-2023-29403".to_string()]);
        assert_eq!(finding.references.len(), 2);
    }
}
