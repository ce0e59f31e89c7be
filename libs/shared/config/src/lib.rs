use std::env;
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// Static word vectors loaded from a local file at startup
    WordVectors,
    /// OpenAI-compatible `/v1/embeddings` endpoint
    Remote,
}

impl FromStr for EmbeddingBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "word_vectors" | "word-vectors" | "local" => Ok(EmbeddingBackend::WordVectors),
            "remote" | "openai" => Ok(EmbeddingBackend::Remote),
            other => Err(format!("Unknown embedding backend: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub server_port: u16,
    pub embedding_backend: EmbeddingBackend,
    pub word_vectors_path: String,
    pub embedding_api_url: String,
    pub embedding_api_key: String,
    pub embedding_model: String,
    pub recommendation_threshold: f64,
    pub keyword_match_score: f64,
    pub max_recommendations: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            server_port: 3000,
            embedding_backend: EmbeddingBackend::WordVectors,
            word_vectors_path: "models/word_vectors.txt".to_string(),
            embedding_api_url: "https://api.openai.com".to_string(),
            embedding_api_key: String::new(),
            embedding_model: "text-embedding-3-small".to_string(),
            recommendation_threshold: 0.3,
            keyword_match_score: 0.8,
            max_recommendations: 10,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            server_port: parse_var("SERVER_PORT", defaults.server_port),
            embedding_backend: parse_var("EMBEDDING_BACKEND", defaults.embedding_backend),
            word_vectors_path: env::var("WORD_VECTORS_PATH")
                .unwrap_or_else(|_| defaults.word_vectors_path.clone()),
            embedding_api_url: env::var("EMBEDDING_API_URL")
                .unwrap_or_else(|_| defaults.embedding_api_url.clone()),
            embedding_api_key: env::var("EMBEDDING_API_KEY")
                .unwrap_or_default(),
            embedding_model: env::var("EMBEDDING_MODEL")
                .unwrap_or_else(|_| defaults.embedding_model.clone()),
            recommendation_threshold: parse_var("RECOMMENDATION_THRESHOLD", defaults.recommendation_threshold),
            keyword_match_score: parse_var("KEYWORD_MATCH_SCORE", defaults.keyword_match_score),
            max_recommendations: parse_var("MAX_RECOMMENDATIONS", defaults.max_recommendations),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        if !config.is_embedding_configured() {
            warn!("Embedding backend {:?} not fully configured", config.embedding_backend);
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
    }

    pub fn is_embedding_configured(&self) -> bool {
        match self.embedding_backend {
            EmbeddingBackend::WordVectors => !self.word_vectors_path.is_empty(),
            EmbeddingBackend::Remote => {
                !self.embedding_api_url.is_empty() && !self.embedding_api_key.is_empty()
            }
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
{
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using default {:?}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}
