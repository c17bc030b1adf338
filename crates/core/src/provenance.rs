//! Provenance construction collaborator.

use fhir::{AgentRole, GoalData, ProvenanceAgent, ProvenanceData, Reference};
use uuid::Uuid;

/// Builds Provenance resources for generated goals.
pub trait ProvenanceFactory: Send + Sync {
    fn create_for_resource(&self, goal: &GoalData) -> ProvenanceData;
}

/// Attributes every goal to a single organisation acting as author.
///
/// The provenance `recorded` instant is the goal's `meta.lastUpdated`, so both resources agree
/// on when the goal was produced. A goal without a logical id gets a data-absent target.
#[derive(Clone, Debug)]
pub struct OrganisationProvenance {
    organisation: Reference,
}

impl OrganisationProvenance {
    pub fn new(organisation_id: impl Into<String>) -> Self {
        Self {
            organisation: Reference::new("Organization", organisation_id),
        }
    }
}

impl ProvenanceFactory for OrganisationProvenance {
    fn create_for_resource(&self, goal: &GoalData) -> ProvenanceData {
        ProvenanceData {
            id: Uuid::new_v4(),
            target: goal
                .id
                .as_deref()
                .map(|id| Reference::new("Goal", id))
                .into(),
            recorded: goal.meta.last_updated,
            agents: vec![ProvenanceAgent {
                role: AgentRole::Author,
                who: self.organisation.clone(),
                on_behalf_of: Some(self.organisation.clone()),
            }],
        }
    }
}
