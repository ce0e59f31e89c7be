use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalCondition {
    pub id: i64,
    pub name: String,
    pub icd_code: Option<String>,
}

/// One diagnosis attached to a patient's medical profile.
/// `condition.name` may hold several comma-joined conditions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientCondition {
    pub patient_id: i64,
    pub condition: MedicalCondition,
    pub severity: String,
    pub diagnosis_date: NaiveDate,
}

impl PatientCondition {
    pub fn condition_name(&self) -> &str {
        &self.condition.name
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientConditionProfile {
    pub patient_id: i64,
    pub records: Vec<PatientCondition>,
    pub normalized_conditions: BTreeSet<String>,
}

impl PatientConditionProfile {
    /// False both when the patient has no records and when every record was blank
    pub fn has_usable_conditions(&self) -> bool {
        !self.normalized_conditions.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum PatientError {
    #[error("Patient not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Patient ids are integers; anything else is rejected before lookup.
pub fn parse_patient_id(raw: &str) -> Result<i64, PatientError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| PatientError::ValidationError(format!("Invalid patient id: {}", raw)))
}
