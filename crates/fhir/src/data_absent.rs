//! Data-absent sentinel and its FHIR wire rendering.
//!
//! FHIR distinguishes "this element was not supplied" from "the source system knows the value is
//! missing". The latter is expressed with the `data-absent-reason` extension (or, for coded
//! elements, with a coding from the data-absent-reason code system).
//!
//! [`Value`] carries that distinction through the domain layer. The wire layer renders
//! [`Value::Missing`] as follows:
//! - primitive elements (for example `dueDate`): a `_dueDate` sibling holding the extension,
//! - complex elements (for example `subject`): the element carrying only the extension,
//! - coded elements (for example `measure`): see [`crate::CodeableConcept::data_absent`].

use serde::Serialize;

/// Canonical URL of the `data-absent-reason` extension.
pub const DATA_ABSENT_REASON_URL: &str =
    "http://hl7.org/fhir/StructureDefinition/data-absent-reason";

/// Code system for data-absent reasons, used where a CodeableConcept is required.
pub const DATA_ABSENT_REASON_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/data-absent-reason";

/// The only reason code emitted: the source field was absent.
pub const DATA_ABSENT_UNKNOWN_CODE: &str = "unknown";

/// Display text paired with [`DATA_ABSENT_UNKNOWN_CODE`].
pub const DATA_ABSENT_UNKNOWN_DISPLAY: &str = "Unknown";

// ============================================================================
// Public domain-level types
// ============================================================================

/// A resource element that is either populated or explicitly marked as missing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value<T> {
    /// The source data was available.
    Present(T),
    /// The source data was absent; rendered with a data-absent-reason marker.
    Missing,
}

impl<T> Value<T> {
    /// Returns the populated value, if any.
    pub fn as_present(&self) -> Option<&T> {
        match self {
            Value::Present(v) => Some(v),
            Value::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl<T> From<Option<T>> for Value<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Value::Present(v),
            None => Value::Missing,
        }
    }
}

// ============================================================================
// Wire types (crate-internal)
// ============================================================================

/// Wire representation of a FHIR extension with a `valueCode`.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub(crate) struct ExtensionWire {
    pub url: String,

    #[serde(rename = "valueCode")]
    pub value_code: String,
}

impl ExtensionWire {
    pub(crate) fn data_absent() -> Self {
        Self {
            url: DATA_ABSENT_REASON_URL.to_string(),
            value_code: DATA_ABSENT_UNKNOWN_CODE.to_string(),
        }
    }
}

/// Wire representation of the `_field` companion object of a primitive element.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub(crate) struct PrimitiveElementWire {
    pub extension: Vec<ExtensionWire>,
}

impl PrimitiveElementWire {
    pub(crate) fn data_absent() -> Self {
        Self {
            extension: vec![ExtensionWire::data_absent()],
        }
    }
}

/// Split a primitive [`Value`] into its value and `_value` wire fields.
pub(crate) fn primitive_to_wire<T: ToString>(
    value: &Value<T>,
) -> (Option<String>, Option<PrimitiveElementWire>) {
    match value {
        Value::Present(v) => (Some(v.to_string()), None),
        Value::Missing => (None, Some(PrimitiveElementWire::data_absent())),
    }
}
