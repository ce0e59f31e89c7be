use serde::{Deserialize, Serialize};

use crate::services::embedding::EmbeddingError;

/// Roster row as stored in the `doctors` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorRecord {
    pub id: i64,
    pub full_name: String,
    pub specialization: String,
    pub profile_picture: Option<String>,
    pub qualification: String,
    pub experience: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    Semantic,
    Keyword,
}

/// Best evidence linking one doctor to the patient's conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionMatch {
    pub score: f64,
    pub source: MatchSource,
    pub condition: Option<String>,
}

impl ConditionMatch {
    pub fn none() -> Self {
        Self {
            score: 0.0,
            source: MatchSource::Semantic,
            condition: None,
        }
    }

    pub fn semantic(score: f64, condition: &str) -> Self {
        Self {
            score,
            source: MatchSource::Semantic,
            condition: Some(condition.to_string()),
        }
    }

    /// A keyword hit floors the score and always takes over the reported condition.
    pub fn with_keyword(self, condition: &str, floor: f64) -> Self {
        Self {
            score: self.score.max(floor),
            source: MatchSource::Keyword,
            condition: Some(condition.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationEntry {
    pub id: i64,
    pub full_name: String,
    pub specialization: String,
    pub profile_picture: Option<String>,
    pub qualification: String,
    pub experience: u32,
    pub similarity_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_condition: Option<String>,
}

impl RecommendationEntry {
    pub fn scored(doctor: DoctorRecord, matched: ConditionMatch) -> Self {
        Self {
            id: doctor.id,
            full_name: doctor.full_name,
            specialization: doctor.specialization,
            profile_picture: doctor.profile_picture,
            qualification: doctor.qualification,
            experience: doctor.experience,
            similarity_score: matched.score,
            matched_condition: matched.condition,
        }
    }

    pub fn unscored(doctor: DoctorRecord) -> Self {
        Self::scored(doctor, ConditionMatch::none())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error("Patient not found")]
    PatientNotFound,

    #[error("{0}")]
    Database(String),

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}
