//! Constants used throughout the goal core crate.

/// US Core profile the generated Goal resources claim conformance to.
pub const US_CORE_GOAL_PROFILE: &str =
    "http://hl7.org/fhir/us/core/StructureDefinition/us-core-goal";

/// Version tag written to `meta.versionId`. Goals are regenerated on every read, so there is
/// no version history to track.
pub const GOAL_META_VERSION_ID: &str = "1";

/// Search parameter scoping results to one patient.
pub const PATIENT_SEARCH_PARAM: &str = "patient";

/// Search parameter matching the goal's logical id.
pub const ID_SEARCH_PARAM: &str = "_id";

/// Resource type prefix used when building patient references for search filters.
pub const PATIENT_RESOURCE_TYPE: &str = "Patient";
