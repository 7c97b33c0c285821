use serde::{Deserialize, Serialize};

/// Component value object - an inventoried software unit
///
/// Produced by an external inventory collector. Matching identity is
/// `name@version` after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    #[serde(rename = "type", default)]
    pub component_type: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpe: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecosystem: Option<String>,
}

impl Component {
    pub fn new(component_type: &str, name: &str, version: &str) -> Self {
        Self {
            component_type: component_type.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            ..Default::default()
        }
    }

    pub fn with_cpe(mut self, cpe: &str) -> Self {
        self.cpe = Some(cpe.to_string());
        self
    }

    /// Returns a copy prepared for matching: lower-cased trimmed name,
    /// trimmed version, lower-cased type. A blank CPE is dropped.
    pub fn normalized(&self) -> Self {
        Self {
            component_type: self.component_type.trim().to_lowercase(),
            name: self.name.trim().to_lowercase(),
            version: self.version.trim().to_string(),
            cpe: self
                .cpe
                .as_deref()
                .map(str::trim)
                .filter(|cpe| !cpe.is_empty())
                .map(str::to_string),
            ..self.clone()
        }
    }

    /// True when the component can be looked up at all.
    pub fn is_resolvable(&self) -> bool {
        !self.name.is_empty() && !self.version.is_empty()
    }

    /// `name@version`, the reference findings are attributed to.
    pub fn component_ref(&self) -> String {
        format!("{}@{}", self.name, self.version)
    }
}
