//! Care plan goal records as stored by the EHR.
//!
//! A care plan record embeds one or more goal details. Every field is optional in storage, so
//! the structs here default missing keys on deserialisation and the accessors treat empty
//! strings the same as absent values.

use crate::{GoalError, GoalResult};
use serde::{Deserialize, Serialize};

/// A care plan record carrying goal details.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CarePlanGoalRecord {
    /// Surrogate identifier of the goal.
    pub uuid: Option<String>,

    /// Identifier of the patient the care plan belongs to.
    pub puuid: Option<String>,

    pub details: Vec<GoalDetail>,
}

/// One goal detail line of a care plan.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GoalDetail {
    /// Target date, `YYYY-MM-DD`.
    pub date: Option<String>,
    pub description: Option<String>,
    /// Clinical code, either bare (`1234-5`) or typed (`LOINC:1234-5`).
    pub code: Option<String>,
    /// Free-text label the clinician saw next to the code.
    pub codetext: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl CarePlanGoalRecord {
    pub fn uuid(&self) -> Option<&str> {
        non_empty(&self.uuid)
    }

    pub fn puuid(&self) -> Option<&str> {
        non_empty(&self.puuid)
    }

    /// Parse a single record from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`GoalError::RecordDeserialization`] naming the failing field path when the JSON
    /// does not match the record shape.
    pub fn from_json(json: &str) -> GoalResult<Self> {
        deserialize_json(json, "care plan record")
    }

    /// Parse a JSON array of records.
    ///
    /// # Errors
    ///
    /// Returns [`GoalError::RecordDeserialization`] naming the failing field path.
    pub fn list_from_json(json: &str) -> GoalResult<Vec<Self>> {
        deserialize_json(json, "care plan record list")
    }
}

impl GoalDetail {
    pub fn date(&self) -> Option<&str> {
        non_empty(&self.date)
    }

    pub fn description(&self) -> Option<&str> {
        non_empty(&self.description)
    }

    pub fn code(&self) -> Option<&str> {
        non_empty(&self.code)
    }

    pub fn codetext(&self) -> Option<&str> {
        non_empty(&self.codetext)
    }
}

fn deserialize_json<T: serde::de::DeserializeOwned>(json: &str, what: &str) -> GoalResult<T> {
    let mut deserializer = serde_json::Deserializer::from_str(json);

    serde_path_to_error::deserialize::<_, T>(&mut deserializer).map_err(|err| {
        let path = err.path().to_string();
        let source = err.into_inner();
        let path = if path.is_empty() || path == "." {
            "<root>".to_string()
        } else {
            path
        };
        GoalError::RecordDeserialization(format!("{what} mismatch at {path}: {source}"))
    })
}
