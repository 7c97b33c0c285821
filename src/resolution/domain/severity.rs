use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a finding
///
/// `Unknown` means no score was available. It gates like `None` but is
/// treated as less specific than any scored value when findings are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Unknown,
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Maps a CVSS base score to a severity band.
    pub fn from_cvss_score(score: f64) -> Self {
        if score >= 9.0 {
            Severity::Critical
        } else if score >= 7.0 {
            Severity::High
        } else if score >= 4.0 {
            Severity::Medium
        } else if score > 0.0 {
            Severity::Low
        } else {
            Severity::None
        }
    }

    /// Ordinal position on the none < low < medium < high < critical scale.
    pub fn rank(self) -> u8 {
        match self {
            Severity::Unknown | Severity::None => 0,
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
            Severity::Critical => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Unknown => "unknown",
            Severity::None => "none",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" | "moderate" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            "none" => Ok(Severity::None),
            "unknown" => Ok(Severity::Unknown),
            _ => Err(format!(
                "Invalid severity: {}. Expected one of: none, low, medium, high, critical",
                s
            )),
        }
    }
}

/// Parses a `fail_on` threshold. `none` or an empty value disables gating.
pub fn parse_threshold(value: &str) -> Result<Option<Severity>, String> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    match value.parse::<Severity>()? {
        Severity::None => Ok(None),
        Severity::Unknown => Err(format!(
            "Invalid threshold: {}. Expected one of: none, low, medium, high, critical",
            value
        )),
        severity => Ok(Some(severity)),
    }
}
