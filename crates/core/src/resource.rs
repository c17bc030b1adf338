//! Interface shared by FHIR resource services.

use crate::error::StoreError;
use crate::search::{id_lookup_filters, SearchFilters, SearchParameterDefinition, SearchResult};

/// A service mapping one kind of internal record to one FHIR resource type.
pub trait FhirResourceService {
    /// Internal record shape returned by the backing store.
    type Record;
    /// FHIR resource produced from a record.
    type Resource;

    /// Map an internal record to its FHIR resource.
    fn convert(&self, record: &Self::Record) -> Self::Resource;

    /// Search the backing store. `patient` scopes results to one patient.
    fn search(
        &self,
        filters: &SearchFilters,
        patient: Option<&str>,
    ) -> Result<SearchResult<Self::Record>, StoreError>;

    /// Profiles the generated resources claim conformance to.
    fn profile_uris(&self) -> &[String];

    /// Search parameters this service accepts.
    fn search_parameters(&self) -> &[SearchParameterDefinition];

    /// Fetch by logical id, optionally restricted to one patient.
    fn lookup_by_id(
        &self,
        id: &str,
        patient: Option<&str>,
    ) -> Result<SearchResult<Self::Record>, StoreError> {
        self.search(&id_lookup_filters(id, patient), patient)
    }
}
