use super::severity::Severity;
use serde::{Deserialize, Serialize};

/// Finding - one vulnerability attributed to one component
///
/// Produced by the matcher, the offline resolver, or an external analyzer.
/// Identity is `vuln_id|component_ref`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    #[serde(rename = "vulnID")]
    pub vuln_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvss: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epss: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_score: Option<f64>,
    #[serde(default)]
    pub has_exploit: bool,
    #[serde(default)]
    pub wild_exploited: bool,
    #[serde(default)]
    pub component_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reachability: Option<String>,
}

impl Finding {
    pub fn new(vuln_id: &str, component_ref: &str) -> Self {
        Self {
            vuln_id: vuln_id.to_string(),
            component_ref: component_ref.to_string(),
            ..Default::default()
        }
    }

    /// Key used to collapse duplicate findings.
    pub fn dedup_key(&self) -> String {
        format!("{}|{}", self.vuln_id, self.component_ref)
    }

    /// Primary id followed by every alias.
    pub fn all_ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.vuln_id.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}
