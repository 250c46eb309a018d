use crate::error::PluginResult;
use crate::permissions::Capability;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    pub component: String,
    pub version: String,
    pub release: Option<String>,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    #[serde(default)]
    pub formats: ApplicableFormats,
}

impl PluginManifest {
    pub fn block_qrcode() -> Self {
        Self {
            component: "block_qrcode".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            release: None,
            capabilities: Capability::ALL.to_vec(),
            formats: ApplicableFormats::course_view_only(),
        }
    }

    pub fn load(path: &Path) -> PluginResult<Self> {
        let data = fs::read_to_string(path)?;
        let manifest: PluginManifest = serde_json::from_str(&data)?;
        Ok(manifest)
    }
}

/// Page-format patterns mapped to whether the block may be added there.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct ApplicableFormats(BTreeMap<String, bool>);

impl ApplicableFormats {
    pub fn course_view_only() -> Self {
        Self::from_iter([("course-view", true), ("mod", false), ("my", false)])
    }

    pub fn get(&self, pattern: &str) -> Option<bool> {
        self.0.get(pattern).copied()
    }

    /// The longest pattern equal to `page_type`, or a `-` separated prefix of
    /// it, decides. `all` applies when nothing else matches.
    pub fn allows(&self, page_type: &str) -> bool {
        let best = self
            .0
            .iter()
            .filter(|(pattern, _)| matches_page_type(pattern, page_type))
            .max_by_key(|(pattern, _)| pattern.len());
        match best {
            Some((_, allowed)) => *allowed,
            None => self.get("all").unwrap_or(false),
        }
    }
}

impl<'a> FromIterator<(&'a str, bool)> for ApplicableFormats {
    fn from_iter<I: IntoIterator<Item = (&'a str, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

fn matches_page_type(pattern: &str, page_type: &str) -> bool {
    match page_type.strip_prefix(pattern) {
        Some(rest) => rest.is_empty() || rest.starts_with('-'),
        None => false,
    }
}
