// libs/doctor-cell/src/services/recommendation.rs
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info, error};

use patient_cell::{PatientError, PatientService};
use shared_config::AppConfig;

use crate::models::{ConditionMatch, DoctorRecord, RecommendationEntry, RecommendationError};
use crate::services::doctor::DoctorService;
use crate::services::embedding::{EmbeddedText, EmbeddingCache, EmbeddingError, SharedEmbedder, TextEmbedder};
use crate::services::similarity::{cosine_similarity, keyword_overlap};

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationSettings {
    /// Fused scores must be strictly above this to be recommended
    pub threshold: f64,
    /// Score floor granted by a keyword overlap
    pub keyword_match_score: f64,
    pub max_results: usize,
}

impl Default for RecommendationSettings {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            keyword_match_score: 0.8,
            max_results: 10,
        }
    }
}

impl From<&AppConfig> for RecommendationSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            threshold: config.recommendation_threshold,
            keyword_match_score: config.keyword_match_score,
            max_results: config.max_recommendations,
        }
    }
}

pub struct RecommendationService {
    patient_service: PatientService,
    doctor_service: DoctorService,
    embedder: SharedEmbedder,
    settings: RecommendationSettings,
}

impl RecommendationService {
    pub fn new(config: &AppConfig, embedder: SharedEmbedder) -> Self {
        Self {
            patient_service: PatientService::new(config),
            doctor_service: DoctorService::new(config),
            embedder,
            settings: RecommendationSettings::from(config),
        }
    }

    /// Rank the roster against the patient's conditions.
    ///
    /// A patient with no usable conditions gets the whole roster unscored, in
    /// roster order, with neither the threshold nor the cap applied.
    pub async fn get_recommended_doctors(
        &self,
        patient_id: i64,
    ) -> Result<Vec<RecommendationEntry>, RecommendationError> {
        debug!("Getting recommended doctors for patient: {}", patient_id);

        let profile = self.patient_service
            .get_condition_profile(patient_id)
            .await
            .map_err(|e| match e {
                PatientError::NotFound => RecommendationError::PatientNotFound,
                other => RecommendationError::Database(other.to_string()),
            })?;

        let roster = self.doctor_service.get_roster().await.map_err(|e| {
            error!("Failed to load doctor roster: {}", e);
            RecommendationError::Database(e.to_string())
        })?;

        if !profile.has_usable_conditions() {
            info!(
                "Patient {} has no usable conditions, returning {} unscored doctors",
                patient_id,
                roster.len()
            );
            return Ok(unscored_roster(roster));
        }

        let recommendations = rank_doctors(
            &profile.normalized_conditions,
            roster,
            self.embedder.as_ref(),
            &self.settings,
        )
        .await
        .map_err(|e| {
            error!("Recommendation scoring failed for patient {}: {}", patient_id, e);
            RecommendationError::from(e)
        })?;

        info!(
            "Recommended {} doctors for patient {} from {} conditions",
            recommendations.len(),
            patient_id,
            profile.normalized_conditions.len()
        );

        Ok(recommendations)
    }
}

pub fn unscored_roster(roster: Vec<DoctorRecord>) -> Vec<RecommendationEntry> {
    roster.into_iter().map(RecommendationEntry::unscored).collect()
}

/// Score every doctor against the normalized conditions, keep those strictly
/// above the threshold, and return the best `max_results` by descending score.
/// Equal scores keep roster order.
pub async fn rank_doctors(
    conditions: &BTreeSet<String>,
    roster: Vec<DoctorRecord>,
    embedder: &dyn TextEmbedder,
    settings: &RecommendationSettings,
) -> Result<Vec<RecommendationEntry>, EmbeddingError> {
    let mut cache = EmbeddingCache::new(embedder);

    let mut embedded_conditions = Vec::with_capacity(conditions.len());
    for condition in conditions {
        embedded_conditions.push((condition.as_str(), cache.get(condition).await?));
    }

    let mut scored = Vec::new();
    for doctor in roster {
        let specialization = doctor.specialization.to_lowercase();
        let embedded_specialization = cache.get(&specialization).await?;

        let matched = match_doctor(
            &embedded_conditions,
            &specialization,
            &embedded_specialization,
            settings.keyword_match_score,
        );

        debug!(
            "Doctor {} ({}) scored {:.3} via {:?}",
            doctor.id, specialization, matched.score, matched.source
        );

        if matched.score > settings.threshold {
            scored.push((doctor, matched));
        }
    }

    // stable: ties stay in roster order
    scored.sort_by(|a, b| b.1.score.partial_cmp(&a.1.score).unwrap_or(Ordering::Equal));
    scored.truncate(settings.max_results);

    Ok(scored
        .into_iter()
        .map(|(doctor, matched)| RecommendationEntry::scored(doctor, matched))
        .collect())
}

/// Fuse the semantic and keyword signals for one doctor.
fn match_doctor(
    conditions: &[(&str, Arc<EmbeddedText>)],
    specialization: &str,
    embedded_specialization: &EmbeddedText,
    keyword_match_score: f64,
) -> ConditionMatch {
    let semantic = best_semantic_match(conditions, embedded_specialization);

    let keyword = conditions
        .iter()
        .map(|(condition, _)| *condition)
        .find(|condition| keyword_overlap(condition, specialization));

    match keyword {
        Some(condition) => semantic.with_keyword(condition, keyword_match_score),
        None => semantic,
    }
}

/// Highest positive cosine similarity over the conditions; the first
/// condition reaching a given score keeps it.
fn best_semantic_match(
    conditions: &[(&str, Arc<EmbeddedText>)],
    embedded_specialization: &EmbeddedText,
) -> ConditionMatch {
    let mut best = ConditionMatch::none();

    for (condition, embedded_condition) in conditions {
        let similarity = cosine_similarity(embedded_condition, embedded_specialization);
        if similarity > best.score {
            best = ConditionMatch::semantic(similarity, condition);
        }
    }

    best
}
