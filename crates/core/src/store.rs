//! Care plan storage/query collaborator.
//!
//! The goal service never reads storage itself. It hands filter maps to a [`CarePlanStore`]
//! and returns whatever the store answers, errors included.

use crate::error::StoreError;
use crate::record::CarePlanGoalRecord;
use crate::search::{
    find_parameter, SearchFilters, SearchParameterDefinition, SearchParameterType,
    SearchResult,
};
use fhir::Reference;

/// Query interface over stored care plan goal records.
pub trait CarePlanStore: Send + Sync {
    /// Return the records matching `filters`.
    ///
    /// `use_internal` asks for records in the internal storage shape rather than a
    /// pre-rendered representation. `patient`, when supplied, restricts results to that
    /// patient regardless of `filters`.
    fn search(
        &self,
        filters: &SearchFilters,
        use_internal: bool,
        patient: Option<&str>,
    ) -> Result<SearchResult<CarePlanGoalRecord>, StoreError>;
}

/// A [`CarePlanStore`] over records held in memory.
///
/// Filters are applied through the supplied search parameter declarations: token parameters
/// match exactly, reference parameters accept `Type/id` or a bare id. Unknown parameters are
/// rejected.
#[derive(Clone, Debug)]
pub struct InMemoryCarePlanStore {
    records: Vec<CarePlanGoalRecord>,
    parameters: Vec<SearchParameterDefinition>,
}

impl InMemoryCarePlanStore {
    pub fn new(
        records: Vec<CarePlanGoalRecord>,
        parameters: Vec<SearchParameterDefinition>,
    ) -> Self {
        Self {
            records,
            parameters,
        }
    }

    fn matches(
        &self,
        record: &CarePlanGoalRecord,
        filters: &SearchFilters,
    ) -> Result<bool, StoreError> {
        for (name, value) in filters {
            let parameter = find_parameter(&self.parameters, name).ok_or_else(|| {
                StoreError::new(format!("unsupported search parameter '{name}'"))
            })?;

            let wanted = match parameter.kind {
                SearchParameterType::Token => value.clone(),
                SearchParameterType::Reference if value.contains('/') => {
                    Reference::parse(value).map_err(StoreError::new)?.id
                }
                SearchParameterType::Reference => value.clone(),
            };

            let hit = parameter
                .fields
                .iter()
                .any(|field| field.value_of(record) == Some(wanted.as_str()));
            if !hit {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl CarePlanStore for InMemoryCarePlanStore {
    fn search(
        &self,
        filters: &SearchFilters,
        use_internal: bool,
        patient: Option<&str>,
    ) -> Result<SearchResult<CarePlanGoalRecord>, StoreError> {
        tracing::debug!(
            ?filters,
            use_internal,
            patient,
            "searching in-memory care plan records"
        );

        let mut records = Vec::new();
        for record in &self.records {
            if let Some(puuid) = patient {
                if record.puuid() != Some(puuid) {
                    continue;
                }
            }
            if self.matches(record, filters)? {
                records.push(record.clone());
            }
        }
        Ok(SearchResult::new(records))
    }
}
