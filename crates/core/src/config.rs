//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into the goal service. Nothing here reads environment variables; callers resolve
//! values (for example from `.env`) and hand them to [`CoreConfig::new`].

use crate::constants::US_CORE_GOAL_PROFILE;
use crate::{GoalError, GoalResult};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    profile_uris: Vec<String>,
    organisation_id: String,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `organisation_id` identifies the `Organization` resource that provenance records are
    /// attributed to.
    pub fn new(profile_uris: Vec<String>, organisation_id: String) -> GoalResult<Self> {
        if organisation_id.trim().is_empty() {
            return Err(GoalError::InvalidInput(
                "organisation_id cannot be empty".into(),
            ));
        }

        if profile_uris.iter().all(|p| p.trim().is_empty()) {
            return Err(GoalError::InvalidInput(
                "at least one profile URI is required".into(),
            ));
        }

        Ok(Self {
            profile_uris,
            organisation_id,
        })
    }

    pub fn profile_uris(&self) -> &[String] {
        &self.profile_uris
    }

    pub fn organisation_id(&self) -> &str {
        &self.organisation_id
    }
}

/// Parse profile URIs from an optional comma-separated value.
///
/// If `value` is `None` or contains no non-empty entries, returns the US Core Goal profile.
pub fn profile_uris_from_env_value(value: Option<String>) -> Vec<String> {
    let parsed: Vec<String> = value
        .iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();

    if parsed.is_empty() {
        vec![US_CORE_GOAL_PROFILE.to_string()]
    } else {
        parsed
    }
}
