//! # Goal Core
//!
//! Maps care plan goal records to FHIR Goal resources.
//!
//! This crate contains the mapping service and the collaborator seams it depends on:
//! - [`FhirGoalService`]: record → Goal conversion, id lookup, search pass-through
//! - [`CarePlanStore`]: where records come from
//! - [`Terminology`] and [`Localizer`]: how codes become display text
//! - [`ProvenanceFactory`]: who the generated resources are attributed to
//!
//! **No transport concerns**: rendering lives in the `fhir` crate; process setup (logging,
//! environment) belongs in `goal-cli`.

pub mod config;
pub mod constants;
pub mod error;
pub mod goal;
pub mod localization;
pub mod provenance;
pub mod record;
pub mod resource;
pub mod search;
pub mod store;
pub mod terminology;

pub use config::CoreConfig;
pub use error::{GoalError, GoalResult, StoreError};
pub use goal::{goal_search_parameters, FhirGoalService};
pub use localization::{CatalogLocalizer, IdentityLocalizer, Localizer};
pub use provenance::{OrganisationProvenance, ProvenanceFactory};
pub use record::{CarePlanGoalRecord, GoalDetail};
pub use resource::FhirResourceService;
pub use search::{SearchFilters, SearchParameterDefinition, SearchResult};
pub use store::{CarePlanStore, InMemoryCarePlanStore};
pub use terminology::{CodeTable, Terminology};
