//! FHIR Provenance wire models and rendering.
//!
//! Provenance records who is accountable for a resource produced by this system. Only the
//! elements needed to attribute a generated resource to an organisation are modelled.

use crate::data_absent::Value;
use crate::datatypes::{
    codeable_concept_to_wire, instant_to_wire, reference_to_wire, CodeableConcept,
    CodeableConceptWire, Coding, Reference, ReferenceWire,
};
use crate::FhirError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Code system for provenance participant types.
pub const PROVENANCE_PARTICIPANT_TYPE_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/provenance-participant-type";

// ============================================================================
// Public domain-level types
// ============================================================================

/// Role an agent played in producing the target resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentRole {
    Author,
}

impl AgentRole {
    fn code(self) -> &'static str {
        match self {
            AgentRole::Author => "author",
        }
    }

    fn display(self) -> &'static str {
        match self {
            AgentRole::Author => "Author",
        }
    }
}

/// A participant accountable for the target resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvenanceAgent {
    pub role: AgentRole,
    pub who: Reference,
    pub on_behalf_of: Option<Reference>,
}

/// Domain-level carrier for a Provenance resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvenanceData {
    pub id: Uuid,

    /// Resource the provenance is about. Missing when that resource has no logical id.
    pub target: Value<Reference>,

    pub recorded: DateTime<Utc>,
    pub agents: Vec<ProvenanceAgent>,
}

/// Provenance resource operations.
pub struct Provenance;

impl Provenance {
    /// Render a provenance record as compact FHIR JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Translation`] if serialisation fails.
    pub fn render(data: &ProvenanceData) -> Result<String, FhirError> {
        serde_json::to_string(&domain_to_wire(data))
            .map_err(|e| FhirError::Translation(format!("Failed to serialise provenance: {e}")))
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
struct ProvenanceWire {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    pub id: String,

    pub target: Vec<ReferenceWire>,

    pub recorded: String,

    pub agent: Vec<ProvenanceAgentWire>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
struct ProvenanceAgentWire {
    #[serde(rename = "type")]
    pub agent_type: CodeableConceptWire,

    pub who: ReferenceWire,

    #[serde(rename = "onBehalfOf", skip_serializing_if = "Option::is_none")]
    pub on_behalf_of: Option<ReferenceWire>,
}

fn agent_to_wire(agent: &ProvenanceAgent) -> ProvenanceAgentWire {
    let agent_type = CodeableConcept {
        coding: vec![Coding {
            system: Some(PROVENANCE_PARTICIPANT_TYPE_SYSTEM.to_string()),
            code: agent.role.code().to_string(),
            display: Value::Present(agent.role.display().to_string()),
        }],
        text: None,
    };

    ProvenanceAgentWire {
        agent_type: codeable_concept_to_wire(&agent_type),
        who: reference_to_wire(&Value::Present(agent.who.clone())),
        on_behalf_of: agent
            .on_behalf_of
            .as_ref()
            .map(|r| reference_to_wire(&Value::Present(r.clone()))),
    }
}

fn domain_to_wire(data: &ProvenanceData) -> ProvenanceWire {
    ProvenanceWire {
        resource_type: "Provenance".to_string(),
        id: data.id.to_string(),
        target: vec![reference_to_wire(&data.target)],
        recorded: instant_to_wire(&data.recorded),
        agent: data.agents.iter().map(agent_to_wire).collect(),
    }
}
