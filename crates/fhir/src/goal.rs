//! FHIR Goal wire models and rendering.
//!
//! This module provides the domain-level Goal resource produced by the care plan mapper and
//! the wire model used to render it as FHIR JSON.
//!
//! Responsibilities:
//! - Define public domain-level types for the Goal resource
//! - Define a wire model for serialisation
//! - Translate [`Value::Missing`] elements into data-absent markers
//!
//! Notes:
//! - `description` and `target` are optional as a pair: a goal built from a record with no
//!   details carries neither
//! - A target's `detailString` and `measure` are either both present or both absent

use crate::data_absent::{primitive_to_wire, PrimitiveElementWire, Value};
use crate::datatypes::{
    codeable_concept_to_wire, coded_value_to_wire, meta_to_wire, narrative_to_wire,
    reference_to_wire, CodeableConcept, CodeableConceptWire, Meta, MetaWire, Narrative,
    NarrativeWire, Reference, ReferenceWire,
};
use crate::FhirError;
use chrono::NaiveDate;
use serde::Serialize;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Goal lifecycle status (FHIR `goal-status` value set).
///
/// Goals are mapped from care plans that are in force, so only `active` is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleStatus {
    Active,
}

impl LifecycleStatus {
    fn to_wire(self) -> &'static str {
        match self {
            LifecycleStatus::Active => "active",
        }
    }
}

/// Domain-level carrier for a Goal resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoalData {
    /// Logical id. Absent when the source record had no identifier.
    pub id: Option<String>,

    pub meta: Meta,

    /// Patient the goal is for.
    pub subject: Value<Reference>,

    pub lifecycle_status: LifecycleStatus,

    /// Summary of the goal, present only when the source had details.
    pub description: Option<GoalDescription>,

    /// One target per source detail, present only when the source had details.
    pub targets: Option<Vec<GoalTarget>>,
}

/// Goal summary in plain text plus an HTML rendition for the resource narrative.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoalDescription {
    /// Plain text; may be empty.
    pub text: String,

    /// Inner HTML for the narrative; empty when there is nothing to render.
    pub html: String,
}

/// A single goal target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoalTarget {
    pub due_date: Value<NaiveDate>,
    pub detail: Option<GoalTargetDetail>,
}

/// Described part of a goal target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoalTargetDetail {
    pub text: String,
    pub measure: Value<CodeableConcept>,
}

// ============================================================================
// Public Goal operations
// ============================================================================

/// Goal resource operations.
///
/// This is a zero-sized type used for namespacing goal-related operations.
pub struct Goal;

impl Goal {
    /// Render a goal as compact FHIR JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Translation`] if serialisation fails.
    pub fn render(data: &GoalData) -> Result<String, FhirError> {
        serde_json::to_string(&domain_to_wire(data))
            .map_err(|e| FhirError::Translation(format!("Failed to serialise goal: {e}")))
    }

    /// Render a goal as indented FHIR JSON.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError::Translation`] if serialisation fails.
    pub fn render_pretty(data: &GoalData) -> Result<String, FhirError> {
        serde_json::to_string_pretty(&domain_to_wire(data))
            .map_err(|e| FhirError::Translation(format!("Failed to serialise goal: {e}")))
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
struct GoalWire {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub meta: MetaWire,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<NarrativeWire>,

    #[serde(rename = "lifecycleStatus")]
    pub lifecycle_status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<CodeableConceptWire>,

    pub subject: ReferenceWire,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Vec<GoalTargetWire>>,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
struct GoalTargetWire {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measure: Option<CodeableConceptWire>,

    #[serde(rename = "detailString", skip_serializing_if = "Option::is_none")]
    pub detail_string: Option<String>,

    #[serde(rename = "dueDate", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,

    #[serde(rename = "_dueDate", skip_serializing_if = "Option::is_none")]
    pub due_date_element: Option<PrimitiveElementWire>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn target_to_wire(target: &GoalTarget) -> GoalTargetWire {
    let (due_date, due_date_element) = primitive_to_wire(&target.due_date);

    GoalTargetWire {
        measure: target
            .detail
            .as_ref()
            .map(|d| coded_value_to_wire(&d.measure)),
        detail_string: target.detail.as_ref().map(|d| d.text.clone()),
        due_date,
        due_date_element,
    }
}

fn domain_to_wire(data: &GoalData) -> GoalWire {
    let narrative = data
        .description
        .as_ref()
        .filter(|d| !d.html.is_empty())
        .map(|d| {
            narrative_to_wire(&Narrative {
                div: d.html.clone(),
            })
        });

    GoalWire {
        resource_type: "Goal".to_string(),
        id: data.id.clone(),
        meta: meta_to_wire(&data.meta),
        text: narrative,
        lifecycle_status: data.lifecycle_status.to_wire().to_string(),
        description: data
            .description
            .as_ref()
            .map(|d| codeable_concept_to_wire(&CodeableConcept::text(d.text.clone()))),
        subject: reference_to_wire(&data.subject),
        target: data
            .targets
            .as_ref()
            .map(|targets| targets.iter().map(target_to_wire).collect()),
    }
}
