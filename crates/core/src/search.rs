//! Search parameter declarations and filter construction.
//!
//! A FHIR service declares which search parameters it accepts and which record field each one
//! resolves against. The store uses those declarations to apply filters; the service only
//! builds filter maps and passes them through.

use crate::constants::{ID_SEARCH_PARAM, PATIENT_RESOURCE_TYPE, PATIENT_SEARCH_PARAM};
use crate::record::CarePlanGoalRecord;
use std::collections::BTreeMap;

/// Search filters keyed by parameter name.
pub type SearchFilters = BTreeMap<String, String>;

/// FHIR search parameter type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchParameterType {
    /// Matches a `Type/id` reference (or a bare id) against an identifier field.
    Reference,
    /// Exact match against a field.
    Token,
}

/// Record fields a search parameter can resolve against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordField {
    Uuid,
    Puuid,
}

impl RecordField {
    /// Value of this field on `record`, treating empty strings as absent.
    pub fn value_of(self, record: &CarePlanGoalRecord) -> Option<&str> {
        match self {
            RecordField::Uuid => record.uuid(),
            RecordField::Puuid => record.puuid(),
        }
    }
}

/// A declared search parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchParameterDefinition {
    pub name: &'static str,
    pub kind: SearchParameterType,
    pub fields: Vec<RecordField>,
}

impl SearchParameterDefinition {
    pub fn new(name: &'static str, kind: SearchParameterType, fields: Vec<RecordField>) -> Self {
        Self { name, kind, fields }
    }
}

/// Find the declaration for `name`.
pub fn find_parameter<'a>(
    parameters: &'a [SearchParameterDefinition],
    name: &str,
) -> Option<&'a SearchParameterDefinition> {
    parameters.iter().find(|p| p.name == name)
}

/// Filters for fetching one resource by logical id, optionally scoped to a patient.
pub fn id_lookup_filters(id: &str, patient: Option<&str>) -> SearchFilters {
    let mut filters = SearchFilters::new();
    filters.insert(ID_SEARCH_PARAM.to_string(), id.to_string());
    if let Some(puuid) = patient {
        filters.insert(
            PATIENT_SEARCH_PARAM.to_string(),
            format!("{PATIENT_RESOURCE_TYPE}/{puuid}"),
        );
    }
    filters
}

/// Records returned by a store search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult<R> {
    pub records: Vec<R>,
}

impl<R> SearchResult<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self { records }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

impl<R> IntoIterator for SearchResult<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
