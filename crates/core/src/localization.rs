//! Translation of user-facing text placed into resources.

use crate::{GoalError, GoalResult};
use std::collections::HashMap;
use std::path::Path;

pub trait Localizer: Send + Sync {
    fn translate(&self, text: &str) -> String;
}

/// Leaves text unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityLocalizer;

impl Localizer for IdentityLocalizer {
    fn translate(&self, text: &str) -> String {
        text.to_string()
    }
}

/// Translates text through a catalog of source → translated strings.
///
/// Text without an entry passes through unchanged. The YAML form is a flat mapping:
///
/// ```yaml
/// Body weight: Körpergewicht
/// ```
#[derive(Clone, Debug, Default)]
pub struct CatalogLocalizer {
    entries: HashMap<String, String>,
}

impl CatalogLocalizer {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn from_yaml_str(yaml: &str) -> GoalResult<Self> {
        let entries = serde_yaml::from_str(yaml).map_err(GoalError::YamlDeserialization)?;
        Ok(Self::new(entries))
    }

    pub fn from_path(path: &Path) -> GoalResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(GoalError::FileRead)?;
        Self::from_yaml_str(&yaml)
    }
}

impl Localizer for CatalogLocalizer {
    fn translate(&self, text: &str) -> String {
        self.entries
            .get(text)
            .cloned()
            .unwrap_or_else(|| text.to_string())
    }
}
