use serde::{Deserialize, Serialize};

/// Bulletin - a vulnerability advisory record from the intelligence source
///
/// Mirrors the Vulners document shape so the same type round-trips through
/// the network adapter and the offline cache. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bulletin {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub bulletin_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvss: Option<CvssMetric>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvss3: Option<Cvss3Metric>,
    #[serde(rename = "cvelist", default, skip_serializing_if = "Vec::is_empty")]
    pub cve_list: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub epss: Vec<EpssEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai: Option<AiScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enchantments: Option<Enchantments>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CvssMetric {
    #[serde(default)]
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<String>,
}

/// CVSS v3 block. The API nests the base score under `cvssV3`; some
/// exports flatten it to `score`. Both are accepted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cvss3Metric {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(rename = "cvssV3", default, skip_serializing_if = "Option::is_none")]
    pub cvss_v3: Option<CvssV3>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvssV3 {
    #[serde(default)]
    pub base_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_string: Option<String>,
}

impl Cvss3Metric {
    pub fn base_score(&self) -> Option<f64> {
        self.cvss_v3
            .as_ref()
            .map(|v3| v3.base_score)
            .or(self.score)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EpssEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cve: Option<String>,
    #[serde(default)]
    pub epss: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentile: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AiScore {
    #[serde(default)]
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Enchantments {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exploitation: Option<Exploitation>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exploitation {
    #[serde(default)]
    pub wild_exploited: bool,
}

impl Bulletin {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    /// Best available CVSS base score: v3 first, then v2. Zero counts as absent.
    pub fn best_cvss(&self) -> Option<f64> {
        self.cvss3
            .as_ref()
            .and_then(Cvss3Metric::base_score)
            .filter(|score| *score > 0.0)
            .or_else(|| {
                self.cvss
                    .as_ref()
                    .map(|cvss| cvss.score)
                    .filter(|score| *score > 0.0)
            })
    }

    pub fn is_exploit(&self) -> bool {
        self.bulletin_type.eq_ignore_ascii_case("exploit")
    }

    pub fn is_wild_exploited(&self) -> bool {
        self.enchantments
            .as_ref()
            .and_then(|e| e.exploitation.as_ref())
            .is_some_and(|e| e.wild_exploited)
    }

    /// Checks that the bulletin can be stored: it needs an id to be keyed by
    /// and its scores must be finite numbers.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("bulletin id is empty".to_string());
        }
        let scores = [
            self.cvss.as_ref().map(|c| c.score),
            self.cvss3.as_ref().and_then(Cvss3Metric::base_score),
            self.ai.as_ref().map(|ai| ai.value),
        ];
        if scores.iter().flatten().any(|score| !score.is_finite())
            || self.epss.iter().any(|e| !e.epss.is_finite())
        {
            return Err(format!("bulletin {} carries a non-finite score", self.id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_vulners_document() {
        let json = r#"{
            "id": "CVE-2021-44228",
            "title": "Apache Log4j2 JNDI RCE",
            "type": "cve",
            "cvss": {"score": 9.3, "vector": "AV:N/AC:M/Au:N/C:C/I:C/A:C"},
            "cvss3": {"cvssV3": {"baseScore": 10.0, "vectorString": "CVSS:3.1/AV:N"}},
            "cvelist": ["CVE-2021-44228"],
            "href": "https://vulners.com/cve/CVE-2021-44228",
            "epss": [{"cve": "CVE-2021-44228", "epss": 0.97, "percentile": 1.0}],
            "ai": {"value": 9.9},
            "enchantments": {"exploitation": {"wildExploited": true}},
            "bulletinFamily": "NVD"
        }"#;
        let bulletin: Bulletin = serde_json::from_str(json).unwrap();
        assert_eq!(bulletin.id, "CVE-2021-44228");
        assert_eq!(bulletin.best_cvss(), Some(10.0));
        assert_eq!(bulletin.cve_list, vec!["CVE-2021-44228".to_string()]);
        assert_eq!(bulletin.epss[0].epss, 0.97);
        assert!(bulletin.is_wild_exploited());
        assert!(!bulletin.is_exploit());
    }

    #[test]
    fn test_best_cvss_falls_back_to_v2() {
        let mut bulletin = Bulletin::new("CVE-2014-0160", "Heartbleed");
        bulletin.cvss = Some(CvssMetric {
            score: 5.0,
            vector: None,
        });
        assert_eq!(bulletin.best_cvss(), Some(5.0));

        bulletin.cvss3 = Some(Cvss3Metric {
            score: Some(0.0),
            cvss_v3: None,
        });
        assert_eq!(bulletin.best_cvss(), Some(5.0));
    }

    #[test]
    fn test_best_cvss_flat_v3_score() {
        let json = r#"{"id": "GHSA-jfh8-c2jp-5v3q", "cvss3": {"score": 8.1}}"#;
        let bulletin: Bulletin = serde_json::from_str(json).unwrap();
        assert_eq!(bulletin.best_cvss(), Some(8.1));
    }

    #[test]
    fn test_is_exploit() {
        let mut bulletin = Bulletin::new("EDB-ID:50592", "Log4Shell PoC");
        bulletin.bulletin_type = "exploit".to_string();
        assert!(bulletin.is_exploit());
    }

    #[test]
    fn test_validate_rejects_empty_id() {
        assert!(Bulletin::new("", "no id").validate().is_err());
        assert!(Bulletin::new("   ", "blank id").validate().is_err());
        assert!(Bulletin::new("CVE-2023-0001", "ok").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_non_finite_score() {
        let mut bulletin = Bulletin::new("CVE-2023-0001", "bad score");
        bulletin.cvss = Some(CvssMetric {
            score: f64::NAN,
            vector: None,
        });
        assert!(bulletin.validate().is_err());
    }
}
