//! Clinical terminology collaborator.
//!
//! Codes stored on care plan details are either bare (`1234-5`) or carry a code type prefix
//! (`LOINC:1234-5`). A [`Terminology`] resolves a stored code to its description and to the
//! URI of the code system it belongs to. Unknown codes resolve to `None`, never an error.

use crate::{GoalError, GoalResult};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Code type prefixes and the FHIR code system URIs they map to.
const CODE_TYPE_SYSTEMS: &[(&str, &str)] = &[
    ("LOINC", "http://loinc.org"),
    ("SNOMED-CT", "http://snomed.info/sct"),
    ("SNOMED", "http://snomed.info/sct"),
    ("ICD10", "http://hl7.org/fhir/sid/icd-10-cm"),
    ("CPT4", "http://www.ama-assn.org/go/cpt"),
    ("RXNORM", "http://www.nlm.nih.gov/research/umls/rxnorm"),
];

pub trait Terminology: Send + Sync {
    /// Human-readable description of `code`.
    fn lookup_description(&self, code: &str) -> Option<String>;

    /// FHIR code system URI for `code`.
    fn system_for_code(&self, code: &str) -> Option<String>;
}

/// Code system URI for a `TYPE:code` string, based on its prefix.
pub fn system_for_code_type(code: &str) -> Option<&'static str> {
    let (code_type, _) = code.split_once(':')?;
    CODE_TYPE_SYSTEMS
        .iter()
        .find(|(prefix, _)| prefix.eq_ignore_ascii_case(code_type.trim()))
        .map(|(_, system)| *system)
}

/// A [`Terminology`] backed by a static table of code descriptions.
///
/// The YAML form is:
///
/// ```yaml
/// codes:
///   "LOINC:29463-7": Body weight
///   "SNOMED-CT:38341003": Hypertensive disorder
/// ```
///
/// Systems are resolved from the code type prefix, so bare codes have no system.
#[derive(Clone, Debug, Default)]
pub struct CodeTable {
    descriptions: HashMap<String, String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CodeTableWire {
    #[serde(default)]
    codes: HashMap<String, String>,
}

impl CodeTable {
    pub fn new(descriptions: HashMap<String, String>) -> Self {
        Self { descriptions }
    }

    pub fn from_yaml_str(yaml: &str) -> GoalResult<Self> {
        let wire: CodeTableWire =
            serde_yaml::from_str(yaml).map_err(GoalError::YamlDeserialization)?;
        Ok(Self::new(wire.codes))
    }

    pub fn from_path(path: &Path) -> GoalResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(GoalError::FileRead)?;
        Self::from_yaml_str(&yaml)
    }
}

impl Terminology for CodeTable {
    fn lookup_description(&self, code: &str) -> Option<String> {
        self.descriptions
            .get(code)
            .filter(|d| !d.trim().is_empty())
            .cloned()
    }

    fn system_for_code(&self, code: &str) -> Option<String> {
        system_for_code_type(code).map(str::to_string)
    }
}
