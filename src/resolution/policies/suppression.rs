use crate::shared::error::ResolveError;
use crate::shared::ResolveResult;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

/// Exploitability status attached to a vulnerability id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuppressionStatus {
    NotAffected,
    Fixed,
    Affected,
    UnderInvestigation,
    Other(String),
}

impl SuppressionStatus {
    pub fn parse(value: &str) -> Self {
        match value {
            "not_affected" => SuppressionStatus::NotAffected,
            "fixed" => SuppressionStatus::Fixed,
            "affected" => SuppressionStatus::Affected,
            "under_investigation" => SuppressionStatus::UnderInvestigation,
            other => SuppressionStatus::Other(other.to_string()),
        }
    }

    /// Only `not_affected` and `fixed` hide a finding.
    pub fn suppresses(&self) -> bool {
        matches!(
            self,
            SuppressionStatus::NotAffected | SuppressionStatus::Fixed
        )
    }
}

impl fmt::Display for SuppressionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuppressionStatus::NotAffected => f.write_str("not_affected"),
            SuppressionStatus::Fixed => f.write_str("fixed"),
            SuppressionStatus::Affected => f.write_str("affected"),
            SuppressionStatus::UnderInvestigation => f.write_str("under_investigation"),
            SuppressionStatus::Other(other) => f.write_str(other),
        }
    }
}

#[derive(Deserialize)]
struct VexDocument {
    #[serde(default)]
    statements: Vec<VexStatement>,
}

#[derive(Deserialize)]
struct VexStatement {
    #[serde(default)]
    vulnerability: VexVulnerability,
    #[serde(default)]
    status: String,
}

#[derive(Deserialize, Default)]
struct VexVulnerability {
    #[serde(default)]
    name: String,
}

/// SuppressionMap - vulnerability id to exploitability status
///
/// Built from an OpenVEX document. Product scoping is not supported:
/// a statement applies to every component carrying the vulnerability.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuppressionMap {
    statuses: HashMap<String, SuppressionStatus>,
}

impl SuppressionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a minimal OpenVEX document.
    ///
    /// Statements without a vulnerability name are ignored. A repeated name
    /// overwrites the earlier status and logs a warning.
    ///
    /// # Errors
    /// Returns `ResolveError::Validation` when the document is not valid JSON
    /// of the expected shape.
    pub fn from_openvex(json: &str) -> ResolveResult<Self> {
        let document: VexDocument = serde_json::from_str(json).map_err(|e| {
            ResolveError::validation(format!("failed to parse VEX document: {}", e))
        })?;

        let mut map = Self::new();
        for statement in document.statements {
            let name = statement.vulnerability.name;
            if name.is_empty() {
                continue;
            }
            let status = SuppressionStatus::parse(&statement.status);
            if let Some(previous) = map.statuses.get(&name) {
                warn!(
                    vulnerability = %name,
                    previous_status = %previous,
                    new_status = %status,
                    "duplicate VEX statement, overwriting"
                );
            }
            map.statuses.insert(name, status);
        }
        Ok(map)
    }

    pub fn insert(&mut self, id: impl Into<String>, status: SuppressionStatus) {
        self.statuses.insert(id.into(), status);
    }

    pub fn status(&self, id: &str) -> Option<&SuppressionStatus> {
        self.statuses.get(id)
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}
