use tracing::{debug, error};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Patient, PatientCondition, PatientConditionProfile, PatientError};
use crate::services::conditions::extract_conditions;

const CONDITION_SELECT: &str =
    "patient_id,severity,diagnosis_date,condition:medical_conditions(id,name,icd_code)";

pub struct PatientService {
    supabase: SupabaseClient,
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get_patient(&self, patient_id: i64) -> Result<Patient, PatientError> {
        debug!("Fetching patient: {}", patient_id);

        let path = format!("/rest/v1/patients?id=eq.{}&select=id,full_name", patient_id);
        let result: Vec<Patient> = self.supabase.select(&path).await.map_err(|e| {
            error!("Failed to fetch patient {}: {}", patient_id, e);
            PatientError::DatabaseError(e.to_string())
        })?;

        result.into_iter().next().ok_or(PatientError::NotFound)
    }

    pub async fn get_condition_records(&self, patient_id: i64) -> Result<Vec<PatientCondition>, PatientError> {
        let path = format!(
            "/rest/v1/patient_conditions?patient_id=eq.{}&select={}",
            patient_id, CONDITION_SELECT
        );

        let records: Vec<PatientCondition> = self.supabase.select(&path).await.map_err(|e| {
            error!("Failed to fetch conditions for patient {}: {}", patient_id, e);
            PatientError::DatabaseError(e.to_string())
        })?;

        debug!("Found {} condition records for patient {}", records.len(), patient_id);
        Ok(records)
    }

    /// Resolve the patient, then load and normalize their condition records.
    pub async fn get_condition_profile(&self, patient_id: i64) -> Result<PatientConditionProfile, PatientError> {
        let patient = self.get_patient(patient_id).await?;
        let records = self.get_condition_records(patient.id).await?;
        let normalized_conditions = extract_conditions(&records);

        Ok(PatientConditionProfile {
            patient_id: patient.id,
            records,
            normalized_conditions,
        })
    }
}
