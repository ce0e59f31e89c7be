use std::sync::Arc;
use serde_json::json;

use shared_config::AppConfig;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Point the config at a mock PostgREST server (e.g. `MockServer::uri()`)
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn patient_response(patient_id: i64) -> serde_json::Value {
        json!({
            "id": patient_id
        })
    }

    pub fn patient_condition_response(patient_id: i64, condition_name: &str, severity: &str) -> serde_json::Value {
        json!({
            "patient_id": patient_id,
            "severity": severity,
            "diagnosis_date": "2024-01-15",
            "condition": {
                "id": 1,
                "name": condition_name,
                "icd_code": "R69"
            }
        })
    }

    pub fn doctor_response(
        doctor_id: i64,
        full_name: &str,
        specialization: &str,
        profile_picture: Option<&str>,
    ) -> serde_json::Value {
        json!({
            "id": doctor_id,
            "full_name": full_name,
            "specialization": specialization,
            "profile_picture": profile_picture,
            "qualification": "MBBS",
            "experience": 10
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code
        })
    }
}
