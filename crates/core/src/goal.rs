//! Care plan goals as FHIR Goal resources.
//!
//! Goals are not stored on their own; they are detail lines embedded in a care plan record.
//! [`FhirGoalService`] turns one such record into a Goal resource and forwards searches to the
//! [`CarePlanStore`], adding nothing beyond the filter map.
//!
//! Conversion never fails. Whatever the record is missing is carried into the resource as a
//! data-absent marker ([`Value::Missing`]) so downstream consumers still see every element.

use crate::config::CoreConfig;
use crate::constants::{GOAL_META_VERSION_ID, ID_SEARCH_PARAM, PATIENT_SEARCH_PARAM};
use crate::error::StoreError;
use crate::localization::{IdentityLocalizer, Localizer};
use crate::provenance::ProvenanceFactory;
use crate::record::{CarePlanGoalRecord, GoalDetail};
use crate::resource::FhirResourceService;
use crate::search::{
    RecordField, SearchFilters, SearchParameterDefinition, SearchParameterType, SearchResult,
};
use crate::store::CarePlanStore;
use crate::terminology::Terminology;
use crate::GoalResult;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use fhir::{
    CodeableConcept, Coding, Goal, GoalData, GoalDescription, GoalTarget, GoalTargetDetail,
    LifecycleStatus, Meta, Provenance, ProvenanceData, Reference, Value,
};
use std::sync::Arc;

/// Search parameters accepted for Goal resources.
///
/// `_id` matches the record `uuid`. It is a surrogate: the store synthesises it for the goal
/// detail set of a care plan rather than keeping it as an independent identity.
pub fn goal_search_parameters() -> Vec<SearchParameterDefinition> {
    vec![
        SearchParameterDefinition::new(
            PATIENT_SEARCH_PARAM,
            SearchParameterType::Reference,
            vec![RecordField::Puuid],
        ),
        SearchParameterDefinition::new(
            ID_SEARCH_PARAM,
            SearchParameterType::Token,
            vec![RecordField::Uuid],
        ),
    ]
}

/// Maps care plan goal records to FHIR Goal resources.
#[derive(Clone)]
pub struct FhirGoalService {
    cfg: Arc<CoreConfig>,
    store: Arc<dyn CarePlanStore>,
    terminology: Arc<dyn Terminology>,
    provenance: Arc<dyn ProvenanceFactory>,
    localizer: Arc<dyn Localizer>,
    search_parameters: Vec<SearchParameterDefinition>,
}

impl FhirGoalService {
    pub fn new(
        cfg: Arc<CoreConfig>,
        store: Arc<dyn CarePlanStore>,
        terminology: Arc<dyn Terminology>,
        provenance: Arc<dyn ProvenanceFactory>,
    ) -> Self {
        Self {
            cfg,
            store,
            terminology,
            provenance,
            localizer: Arc::new(IdentityLocalizer),
            search_parameters: goal_search_parameters(),
        }
    }

    /// Use `localizer` for code display text instead of passing it through unchanged.
    pub fn with_localizer(mut self, localizer: Arc<dyn Localizer>) -> Self {
        self.localizer = localizer;
        self
    }

    /// Convert a record and render the resulting Goal as FHIR JSON.
    pub fn convert_to_json(&self, record: &CarePlanGoalRecord) -> GoalResult<String> {
        Ok(Goal::render(&self.convert(record))?)
    }

    /// Build the Provenance resource for a converted goal.
    pub fn create_provenance(&self, goal: &GoalData) -> ProvenanceData {
        self.provenance.create_for_resource(goal)
    }

    /// Build the Provenance resource for a converted goal and render it as FHIR JSON.
    pub fn create_provenance_json(&self, goal: &GoalData) -> GoalResult<String> {
        Ok(Provenance::render(&self.create_provenance(goal))?)
    }

    /// Not supported: goals are only written through care plans. Does nothing.
    pub fn parse_external_resource(&self, _resource: &str) {}

    /// Not supported: goals are only written through care plans. Does nothing.
    pub fn insert(&self, _goal: &GoalData) {}

    /// Not supported: goals are only written through care plans. Does nothing.
    pub fn update(&self, _id: &str, _goal: &GoalData) {}

    fn convert_at(&self, record: &CarePlanGoalRecord, now: DateTime<Utc>) -> GoalData {
        tracing::debug!(
            uuid = record.uuid(),
            details = record.details.len(),
            "converting care plan goal"
        );

        let subject: Value<Reference> = record.puuid().map(Reference::patient).into();

        let (description, targets) = if record.details.is_empty() {
            (None, None)
        } else {
            let targets: Vec<GoalTarget> = record
                .details
                .iter()
                .map(|detail| self.target_for(detail))
                .collect();
            (Some(describe(&record.details)), Some(targets))
        };

        GoalData {
            id: record.uuid().map(str::to_string),
            meta: Meta {
                version_id: GOAL_META_VERSION_ID.to_string(),
                last_updated: now,
                profile: self.cfg.profile_uris().to_vec(),
            },
            subject,
            lifecycle_status: LifecycleStatus::Active,
            description,
            targets,
        }
    }

    fn target_for(&self, detail: &GoalDetail) -> GoalTarget {
        let detail_part = detail.description().map(|text| GoalTargetDetail {
            text: text.to_string(),
            measure: detail
                .code()
                .map(|code| self.measure_for(code, detail.codetext()))
                .into(),
        });

        GoalTarget {
            due_date: detail.date().and_then(parse_due_date).into(),
            detail: detail_part,
        }
    }

    /// Single-coding concept for `code`. `codetext` is kept as the concept text.
    fn measure_for(&self, code: &str, codetext: Option<&str>) -> CodeableConcept {
        let display_text = self
            .terminology
            .lookup_description(code)
            .map(|d| self.localizer.translate(&d));
        let system = self.terminology.system_for_code(code);

        if display_text.is_none() || system.is_none() {
            tracing::warn!(
                code,
                has_display = display_text.is_some(),
                has_system = system.is_some(),
                "code not fully resolved by terminology"
            );
        }

        CodeableConcept {
            coding: vec![Coding {
                system,
                code: code.to_string(),
                display: display_text.into(),
            }],
            text: codetext.map(str::to_string),
        }
    }
}

impl FhirResourceService for FhirGoalService {
    type Record = CarePlanGoalRecord;
    type Resource = GoalData;

    /// `meta.lastUpdated` is the time of the call.
    fn convert(&self, record: &CarePlanGoalRecord) -> GoalData {
        self.convert_at(record, Utc::now())
    }

    fn search(
        &self,
        filters: &SearchFilters,
        patient: Option<&str>,
    ) -> Result<SearchResult<CarePlanGoalRecord>, StoreError> {
        tracing::debug!(?filters, patient, "searching care plan goals");
        self.store.search(filters, true, patient)
    }

    fn profile_uris(&self) -> &[String] {
        self.cfg.profile_uris()
    }

    fn search_parameters(&self) -> &[SearchParameterDefinition] {
        &self.search_parameters
    }
}

/// Plain-text and HTML summaries of all detail descriptions.
fn describe(details: &[GoalDetail]) -> GoalDescription {
    let descriptions: Vec<&str> = details.iter().filter_map(GoalDetail::description).collect();

    GoalDescription {
        text: descriptions.join("\n"),
        html: descriptions
            .iter()
            .map(|d| format!("<p>{}</p>", escape_html(d)))
            .collect(),
    }
}

/// Date-time layouts accepted after a `YYYY-MM-DD` prefix. `%.f` also matches no fraction.
const DUE_DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Accepts `YYYY-MM-DD`, optionally followed by a `T` or space separated time of day and an
/// optional UTC offset. The date is taken as written, not shifted by the offset.
fn parse_due_date(date: &str) -> Option<NaiveDate> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(date)
                .ok()
                .map(|at| at.date_naive())
        })
        .or_else(|| {
            DUE_DATE_TIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(date, format).ok())
                .map(|at| at.date())
        });
    if parsed.is_none() {
        tracing::warn!(date, "unparseable goal due date");
    }
    parsed
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::US_CORE_GOAL_PROFILE;
    use crate::localization::CatalogLocalizer;
    use crate::provenance::OrganisationProvenance;
    use crate::store::InMemoryCarePlanStore;
    use crate::terminology::CodeTable;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        calls: Mutex<Vec<(SearchFilters, bool, Option<String>)>>,
    }

    impl CarePlanStore for RecordingStore {
        fn search(
            &self,
            filters: &SearchFilters,
            use_internal: bool,
            patient: Option<&str>,
        ) -> Result<SearchResult<CarePlanGoalRecord>, StoreError> {
            self.calls.lock().unwrap().push((
                filters.clone(),
                use_internal,
                patient.map(str::to_string),
            ));
            Ok(SearchResult::new(vec![]))
        }
    }

    struct FailingStore;

    impl CarePlanStore for FailingStore {
        fn search(
            &self,
            _filters: &SearchFilters,
            _use_internal: bool,
            _patient: Option<&str>,
        ) -> Result<SearchResult<CarePlanGoalRecord>, StoreError> {
            Err(StoreError::new("connection refused"))
        }
    }

    fn config() -> Arc<CoreConfig> {
        Arc::new(
            CoreConfig::new(vec![US_CORE_GOAL_PROFILE.to_string()], "org-1".into())
                .expect("valid config"),
        )
    }

    fn terminology() -> Arc<CodeTable> {
        let mut codes = HashMap::new();
        codes.insert("1234-5".to_string(), "Body weight".to_string());
        codes.insert("LOINC:8480-6".to_string(), "Systolic blood pressure".to_string());
        Arc::new(CodeTable::new(codes))
    }

    fn service_with_store(store: Arc<dyn CarePlanStore>) -> FhirGoalService {
        FhirGoalService::new(
            config(),
            store,
            terminology(),
            Arc::new(OrganisationProvenance::new("org-1")),
        )
    }

    fn service() -> FhirGoalService {
        service_with_store(Arc::new(RecordingStore::default()))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap()
    }

    fn detail(date: &str, description: &str, code: &str) -> GoalDetail {
        GoalDetail {
            date: Some(date.into()),
            description: Some(description.into()),
            code: Some(code.into()),
            codetext: None,
        }
    }

    fn record(details: Vec<GoalDetail>) -> CarePlanGoalRecord {
        CarePlanGoalRecord {
            uuid: Some("u1".into()),
            puuid: Some("p1".into()),
            details,
        }
    }

    #[test]
    fn converts_worked_example() {
        let goal = service().convert_at(
            &record(vec![detail("2023-01-01", "Lose weight", "1234-5")]),
            now(),
        );

        assert_eq!(goal.id.as_deref(), Some("u1"));
        assert_eq!(goal.meta.version_id, "1");
        assert_eq!(goal.meta.last_updated, now());
        assert_eq!(goal.meta.profile, vec![US_CORE_GOAL_PROFILE.to_string()]);
        assert_eq!(goal.lifecycle_status, LifecycleStatus::Active);
        assert_eq!(
            goal.subject.as_present().map(ToString::to_string).as_deref(),
            Some("Patient/p1")
        );

        let targets = goal.targets.expect("targets");
        assert_eq!(targets.len(), 1);
        assert_eq!(
            targets[0].due_date,
            Value::Present(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap())
        );

        let detail = targets[0].detail.as_ref().expect("detail");
        assert_eq!(detail.text, "Lose weight");
        let measure = detail.measure.as_present().expect("measure");
        assert_eq!(measure.coding.len(), 1);
        assert_eq!(measure.coding[0].code, "1234-5");
        assert_eq!(measure.coding[0].display, Value::Present("Body weight".into()));
        // bare codes carry no code type, so no system
        assert_eq!(measure.coding[0].system, None);
    }

    #[test]
    fn empty_details_leave_description_and_targets_unset() {
        let goal = service().convert_at(&record(vec![]), now());
        assert!(goal.description.is_none());
        assert!(goal.targets.is_none());
    }

    #[test]
    fn one_target_per_detail_in_order() {
        let details = vec![
            detail("2023-01-01", "First", "1234-5"),
            detail("2023-02-01", "", "1234-5"),
            detail("2023-03-01", "Third", ""),
        ];
        let goal = service().convert_at(&record(details), now());

        let targets = goal.targets.expect("targets");
        assert_eq!(targets.len(), 3);
        let dates: Vec<String> = targets
            .iter()
            .map(|t| t.due_date.as_present().expect("date").to_string())
            .collect();
        assert_eq!(dates, vec!["2023-01-01", "2023-02-01", "2023-03-01"]);
    }

    #[test]
    fn description_without_code_gets_missing_measure() {
        let goal = service().convert_at(&record(vec![detail("2023-01-01", "Walk", "")]), now());
        let targets = goal.targets.expect("targets");
        let detail = targets[0].detail.as_ref().expect("detail");
        assert_eq!(detail.text, "Walk");
        assert!(detail.measure.is_missing());
    }

    #[test]
    fn empty_description_yields_due_date_only() {
        let goal = service().convert_at(
            &record(vec![detail("2023-01-01", "", "1234-5")]),
            now(),
        );
        let targets = goal.targets.expect("targets");
        assert!(targets[0].detail.is_none());
        assert!(!targets[0].due_date.is_missing());
    }

    #[test]
    fn missing_or_bad_date_is_marked_missing() {
        let mut no_date = detail("", "Walk", "");
        no_date.date = None;
        let details = vec![no_date, detail("", "Walk", ""), detail("soon", "Walk", "")];
        let goal = service().convert_at(&record(details), now());
        assert!(goal
            .targets
            .expect("targets")
            .iter()
            .all(|t| t.due_date.is_missing()));
    }

    #[test]
    fn due_date_accepts_datetime_strings() {
        assert_eq!(
            parse_due_date("2023-01-01 00:00:00"),
            NaiveDate::from_ymd_opt(2023, 1, 1)
        );
        assert_eq!(
            parse_due_date("2023-01-01T23:30:00.250-05:00"),
            NaiveDate::from_ymd_opt(2023, 1, 1)
        );
        assert_eq!(
            parse_due_date("2023-01-01T08:15"),
            NaiveDate::from_ymd_opt(2023, 1, 1)
        );
        assert_eq!(parse_due_date("2023"), None);
    }

    #[test]
    fn due_date_rejects_trailing_text_that_is_not_a_time() {
        assert_eq!(parse_due_date("2023-01-01garbage"), None);
        assert_eq!(parse_due_date("2023-01-01T"), None);
        assert_eq!(parse_due_date("2023-01-01 noon"), None);

        let input = record(vec![detail("2023-01-01garbage", "Walk", "")]);
        let goal = service().convert_at(&input, now());
        assert!(goal.targets.expect("targets")[0].due_date.is_missing());
    }

    #[test]
    fn absent_patient_is_marked_missing() {
        let mut input = record(vec![]);
        input.puuid = None;
        assert!(service().convert_at(&input, now()).subject.is_missing());

        input.puuid = Some(String::new());
        assert!(service().convert_at(&input, now()).subject.is_missing());
    }

    #[test]
    fn absent_uuid_leaves_id_unset() {
        let mut input = record(vec![]);
        input.uuid = None;
        assert!(service().convert_at(&input, now()).id.is_none());
    }

    #[test]
    fn description_joins_texts_and_escapes_html() {
        let details = vec![
            detail("2023-01-01", "Walk <30 min>", ""),
            detail("2023-01-01", "", ""),
            detail("2023-01-01", "Eat & sleep", ""),
        ];
        let goal = service().convert_at(&record(details), now());
        let description = goal.description.expect("description");
        assert_eq!(description.text, "Walk <30 min>\nEat & sleep");
        assert_eq!(
            description.html,
            "<p>Walk &lt;30 min&gt;</p><p>Eat &amp; sleep</p>"
        );
    }

    #[test]
    fn description_is_empty_string_when_no_detail_is_described() {
        let goal = service().convert_at(&record(vec![detail("2023-01-01", "", "")]), now());
        let description = goal.description.expect("description");
        assert_eq!(description.text, "");
        assert_eq!(description.html, "");
    }

    #[test]
    fn typed_code_resolves_system_and_display() {
        let goal = service().convert_at(
            &record(vec![detail("2023-01-01", "Lower BP", "LOINC:8480-6")]),
            now(),
        );
        let targets = goal.targets.expect("targets");
        let measure = targets[0]
            .detail
            .as_ref()
            .and_then(|d| d.measure.as_present())
            .expect("measure");
        assert_eq!(measure.coding[0].code, "LOINC:8480-6");
        assert_eq!(measure.coding[0].system.as_deref(), Some("http://loinc.org"));
        assert_eq!(
            measure.coding[0].display,
            Value::Present("Systolic blood pressure".into())
        );
    }

    #[test]
    fn codetext_becomes_measure_text() {
        let mut described = detail("2023-01-01", "Lose weight", "1234-5");
        described.codetext = Some("Weight".into());
        let goal = service().convert_at(&record(vec![described]), now());
        let targets = goal.targets.expect("targets");
        let measure = targets[0]
            .detail
            .as_ref()
            .and_then(|d| d.measure.as_present())
            .expect("measure");
        assert_eq!(measure.text.as_deref(), Some("Weight"));
    }

    #[test]
    fn unknown_code_has_missing_display() {
        let goal = service().convert_at(
            &record(vec![detail("2023-01-01", "Lose weight", "9999-9")]),
            now(),
        );
        let targets = goal.targets.expect("targets");
        let measure = targets[0]
            .detail
            .as_ref()
            .and_then(|d| d.measure.as_present())
            .expect("measure");
        assert_eq!(measure.coding.len(), 1);
        assert_eq!(measure.coding[0].code, "9999-9");
        assert!(measure.coding[0].display.is_missing());
    }

    #[test]
    fn display_text_is_localised() {
        let localizer =
            CatalogLocalizer::from_yaml_str("Body weight: Peso corporal\n").expect("catalog");
        let service = service().with_localizer(Arc::new(localizer));
        let goal = service.convert_at(
            &record(vec![detail("2023-01-01", "Lose weight", "1234-5")]),
            now(),
        );
        let targets = goal.targets.expect("targets");
        let measure = targets[0]
            .detail
            .as_ref()
            .and_then(|d| d.measure.as_present())
            .expect("measure");
        assert_eq!(measure.coding[0].display, Value::Present("Peso corporal".into()));
    }

    #[test]
    fn convert_stamps_current_time() {
        let before = Utc::now();
        let goal = service().convert(&record(vec![]));
        assert!(goal.meta.last_updated >= before);
        assert!(goal.meta.last_updated <= Utc::now());
    }

    #[test]
    fn json_rendering_of_worked_example() {
        let json = service()
            .convert_to_json(&record(vec![detail("2023-01-01", "Lose weight", "1234-5")]))
            .expect("render");
        let json: serde_json::Value = serde_json::from_str(&json).expect("valid json");

        assert_eq!(json["resourceType"], "Goal");
        assert_eq!(json["subject"]["reference"], "Patient/p1");
        assert_eq!(json["target"][0]["dueDate"], "2023-01-01");
        assert_eq!(json["target"][0]["detailString"], "Lose weight");
        assert_eq!(json["target"][0]["measure"]["coding"][0]["code"], "1234-5");
        assert_eq!(json["description"]["text"], "Lose weight");
    }

    #[test]
    fn lookup_by_id_searches_by_id_only() {
        let store = Arc::new(RecordingStore::default());
        let service = service_with_store(store.clone());

        service.lookup_by_id("g-123", None).expect("lookup");

        let calls = store.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (filters, use_internal, patient) = &calls[0];
        assert_eq!(filters.len(), 1);
        assert_eq!(filters.get("_id").map(String::as_str), Some("g-123"));
        assert!(*use_internal);
        assert!(patient.is_none());
    }

    #[test]
    fn lookup_by_id_adds_patient_scope() {
        let store = Arc::new(RecordingStore::default());
        let service = service_with_store(store.clone());

        service.lookup_by_id("g-123", Some("p-1")).expect("lookup");

        let calls = store.calls.lock().unwrap();
        let (filters, _, patient) = &calls[0];
        assert_eq!(filters.len(), 2);
        assert_eq!(
            filters.get("patient").map(String::as_str),
            Some("Patient/p-1")
        );
        assert_eq!(patient.as_deref(), Some("p-1"));
    }

    #[test]
    fn search_passes_filters_through() {
        let store = Arc::new(RecordingStore::default());
        let service = service_with_store(store.clone());

        let mut filters = SearchFilters::new();
        filters.insert("patient".into(), "Patient/p1".into());
        service.search(&filters, None).expect("search");

        let calls = store.calls.lock().unwrap();
        assert_eq!(calls[0].0, filters);
        assert!(calls[0].1);
    }

    #[test]
    fn store_errors_propagate_unchanged() {
        let service = service_with_store(Arc::new(FailingStore));
        let err = service.lookup_by_id("g-123", None).expect_err("store fails");
        assert_eq!(err.to_string(), "care plan store error: connection refused");
    }

    #[test]
    fn lookup_against_in_memory_store() {
        let records = vec![
            record(vec![detail("2023-01-01", "Lose weight", "1234-5")]),
            CarePlanGoalRecord {
                uuid: Some("u2".into()),
                puuid: Some("p2".into()),
                details: vec![],
            },
        ];
        let store = Arc::new(InMemoryCarePlanStore::new(records, goal_search_parameters()));
        let service = service_with_store(store);

        let found = service.lookup_by_id("u1", None).expect("lookup");
        assert_eq!(found.len(), 1);

        let hidden = service.lookup_by_id("u2", Some("p1")).expect("lookup");
        assert!(hidden.is_empty());
    }

    #[test]
    fn declares_patient_and_id_parameters() {
        let service = service();
        let names: Vec<&str> = service.search_parameters().iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["patient", "_id"]);
        assert_eq!(service.profile_uris(), [US_CORE_GOAL_PROFILE.to_string()]);
    }

    #[test]
    fn provenance_is_delegated() {
        let service = service();
        let goal = service.convert_at(&record(vec![]), now());

        let provenance = service.create_provenance(&goal);
        assert_eq!(
            provenance.target.as_present().map(ToString::to_string).as_deref(),
            Some("Goal/u1")
        );
        assert_eq!(provenance.recorded, now());

        let json = service.create_provenance_json(&goal).expect("render");
        assert!(json.contains("\"resourceType\":\"Provenance\""));
    }

    #[test]
    fn write_operations_do_nothing() {
        let store = Arc::new(RecordingStore::default());
        let service = service_with_store(store.clone());
        let goal = service.convert_at(&record(vec![]), now());

        service.parse_external_resource("{}");
        service.insert(&goal);
        service.update("u1", &goal);

        assert!(store.calls.lock().unwrap().is_empty());
    }
}
