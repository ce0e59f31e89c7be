pub mod doctor;
pub mod embedding;
pub mod similarity;
pub mod recommendation;

pub use doctor::DoctorService;
pub use embedding::{
    load_embedder, EmbeddedText, EmbeddingCache, EmbeddingError, RemoteEmbedder,
    SharedEmbedder, TextEmbedder, WordVectorEmbedder,
};
pub use similarity::{cosine_similarity, keyword_overlap};
pub use recommendation::{rank_doctors, unscored_roster, RecommendationService, RecommendationSettings};
