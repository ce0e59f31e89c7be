use anyhow::Result;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::DoctorRecord;

const ROSTER_SELECT: &str = "id,full_name,specialization,profile_picture,qualification,experience";

pub struct DoctorService {
    supabase: SupabaseClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Full doctor roster in stable id order, with profile pictures resolved
    /// to public URLs.
    pub async fn get_roster(&self) -> Result<Vec<DoctorRecord>> {
        let path = format!("/rest/v1/doctors?select={}&order=id.asc", ROSTER_SELECT);
        let doctors: Vec<DoctorRecord> = self.supabase.select(&path).await?;

        debug!("Loaded roster of {} doctors", doctors.len());

        Ok(doctors
            .into_iter()
            .map(|mut doctor| {
                doctor.profile_picture = doctor
                    .profile_picture
                    .as_deref()
                    .and_then(|picture| self.profile_picture_url(picture));
                doctor
            })
            .collect())
    }

    /// Storage paths become public bucket URLs; absolute URLs pass through and
    /// blank references mean no picture.
    pub fn profile_picture_url(&self, reference: &str) -> Option<String> {
        let reference = reference.trim();
        if reference.is_empty() {
            None
        } else if reference.starts_with("http://") || reference.starts_with("https://") {
            Some(reference.to_string())
        } else {
            Some(self.supabase.get_public_url(reference))
        }
    }
}
