//! FHIR wire/boundary support for care plan goals.
//!
//! This crate provides **wire models** and **rendering helpers** for the FHIR R4 resources
//! produced from care plan records:
//! - `Goal` resources built from care plan goal details
//! - `Provenance` resources attributing those goals to an organisation
//!
//! This crate focuses on:
//! - FHIR JSON rendering
//! - the data-absent sentinel ([`Value`]) and its wire representation
//! - translation between domain-level structs and wire structs
//!
//! It does not know where records come from or how codes are resolved; that lives in
//! `goal-core`.

pub mod data_absent;
pub mod datatypes;
pub mod goal;
pub mod provenance;

// Re-export facades
pub use goal::Goal;
pub use provenance::Provenance;

// Re-export public domain-level types
pub use data_absent::Value;
pub use datatypes::{CodeableConcept, Coding, Meta, Narrative, Reference};
pub use goal::{GoalData, GoalDescription, GoalTarget, GoalTargetDetail, LifecycleStatus};
pub use provenance::{AgentRole, ProvenanceAgent, ProvenanceData};

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
