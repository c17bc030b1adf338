#[derive(Debug, thiserror::Error)]
pub enum GoalError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to read file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to deserialize record: {0}")]
    RecordDeserialization(String),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),

    #[error("FHIR error: {0}")]
    Fhir(#[from] fhir::FhirError),
}

pub type GoalResult<T> = std::result::Result<T, GoalError>;

/// Failure reported by a [`CarePlanStore`](crate::store::CarePlanStore).
///
/// The goal service hands these back to its caller untouched.
#[derive(Debug, thiserror::Error)]
#[error("care plan store error: {source}")]
pub struct StoreError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl StoreError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            source: source.into(),
        }
    }
}
