//! FHIR general-purpose datatypes shared by the resource modules.
//!
//! Each datatype has a public domain-level struct and a crate-internal wire struct. Resource
//! modules compose the wire structs when rendering.

use crate::data_absent::{
    primitive_to_wire, ExtensionWire, PrimitiveElementWire, Value, DATA_ABSENT_REASON_SYSTEM,
    DATA_ABSENT_UNKNOWN_CODE, DATA_ABSENT_UNKNOWN_DISPLAY,
};
use crate::FhirError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// XHTML namespace required on narrative `div` elements.
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

// ============================================================================
// Public domain-level types
// ============================================================================

/// A literal relative reference such as `Patient/90a8d1ea`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    pub resource_type: String,
    pub id: String,
}

impl Reference {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Reference to a `Patient` resource.
    pub fn patient(id: impl Into<String>) -> Self {
        Self::new("Patient", id)
    }

    /// Parse a relative reference of the form `Type/id`.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::InvalidInput`] if either part is empty or the separator is missing.
    pub fn parse(reference: &str) -> Result<Self, FhirError> {
        match reference.split_once('/') {
            Some((resource_type, id)) if !resource_type.is_empty() && !id.is_empty() => {
                Ok(Self::new(resource_type, id))
            }
            _ => Err(FhirError::InvalidInput(format!(
                "Expected a relative reference of the form Type/id, got '{reference}'"
            ))),
        }
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.resource_type, self.id)
    }
}

/// A single code from a terminology.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coding {
    /// Code system URI, when the terminology knows it.
    pub system: Option<String>,
    pub code: String,
    pub display: Value<String>,
}

/// A concept expressed as one or more codings and/or free text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodeableConcept {
    pub coding: Vec<Coding>,
    pub text: Option<String>,
}

impl CodeableConcept {
    /// Concept with free text only.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            coding: Vec::new(),
            text: Some(text.into()),
        }
    }

    /// Concept stating that the coded value is unknown.
    pub fn data_absent() -> Self {
        Self {
            coding: vec![Coding {
                system: Some(DATA_ABSENT_REASON_SYSTEM.to_string()),
                code: DATA_ABSENT_UNKNOWN_CODE.to_string(),
                display: Value::Present(DATA_ABSENT_UNKNOWN_DISPLAY.to_string()),
            }],
            text: None,
        }
    }
}

/// Resource metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Meta {
    pub version_id: String,
    pub last_updated: DateTime<Utc>,
    pub profile: Vec<String>,
}

/// Generated XHTML narrative. `div` holds the inner markup only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Narrative {
    pub div: String,
}

// ============================================================================
// Wire types (crate-internal)
// ============================================================================

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub(crate) struct ReferenceWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extension: Vec<ExtensionWire>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub(crate) struct CodingWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    pub code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    #[serde(rename = "_display", skip_serializing_if = "Option::is_none")]
    pub display_element: Option<PrimitiveElementWire>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub(crate) struct CodeableConceptWire {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<CodingWire>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub(crate) struct MetaWire {
    #[serde(rename = "versionId")]
    pub version_id: String,

    #[serde(rename = "lastUpdated")]
    pub last_updated: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub profile: Vec<String>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub(crate) struct NarrativeWire {
    pub status: String,
    pub div: String,
}

// ============================================================================
// Translation helpers (crate-internal)
// ============================================================================

pub(crate) fn reference_to_wire(value: &Value<Reference>) -> ReferenceWire {
    match value {
        Value::Present(r) => ReferenceWire {
            reference: Some(r.to_string()),
            extension: Vec::new(),
        },
        Value::Missing => ReferenceWire {
            reference: None,
            extension: vec![ExtensionWire::data_absent()],
        },
    }
}

pub(crate) fn coding_to_wire(coding: &Coding) -> CodingWire {
    let (display, display_element) = primitive_to_wire(&coding.display);
    CodingWire {
        system: coding.system.clone(),
        code: coding.code.clone(),
        display,
        display_element,
    }
}

pub(crate) fn codeable_concept_to_wire(concept: &CodeableConcept) -> CodeableConceptWire {
    CodeableConceptWire {
        coding: concept.coding.iter().map(coding_to_wire).collect(),
        text: concept.text.clone(),
    }
}

/// Coded elements have no extension form, so a missing concept becomes the data-absent coding.
pub(crate) fn coded_value_to_wire(value: &Value<CodeableConcept>) -> CodeableConceptWire {
    match value {
        Value::Present(c) => codeable_concept_to_wire(c),
        Value::Missing => codeable_concept_to_wire(&CodeableConcept::data_absent()),
    }
}

/// FHIR instants: RFC 3339 in UTC with a `Z` suffix.
pub(crate) fn instant_to_wire(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn meta_to_wire(meta: &Meta) -> MetaWire {
    MetaWire {
        version_id: meta.version_id.clone(),
        last_updated: instant_to_wire(&meta.last_updated),
        profile: meta.profile.clone(),
    }
}

pub(crate) fn narrative_to_wire(narrative: &Narrative) -> NarrativeWire {
    NarrativeWire {
        status: "generated".to_string(),
        div: format!("<div xmlns=\"{XHTML_NAMESPACE}\">{}</div>", narrative.div),
    }
}
