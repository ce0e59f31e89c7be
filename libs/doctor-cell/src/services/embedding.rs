// libs/doctor-cell/src/services/embedding.rs
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use shared_config::{AppConfig, EmbeddingBackend};

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("Embedding model not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("Failed to load embedding model: {0}")]
    ModelLoad(String),

    #[error("Embedding backend unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid embedding response: {0}")]
    InvalidResponse(String),
}

/// Dense vector for a piece of text. A zero norm marks text the model could
/// not resolve; similarities against it are always 0.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedText {
    vector: Vec<f32>,
    norm: f64,
}

impl EmbeddedText {
    pub fn new(vector: Vec<f32>) -> Self {
        let norm = vector
            .iter()
            .map(|&x| (x as f64) * (x as f64))
            .sum::<f64>()
            .sqrt();

        Self {
            vector,
            norm: if norm.is_finite() { norm } else { 0.0 },
        }
    }

    pub fn zero(dimension: usize) -> Self {
        Self {
            vector: vec![0.0; dimension],
            norm: 0.0,
        }
    }

    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    pub fn norm(&self) -> f64 {
        self.norm
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }

    pub fn is_degenerate(&self) -> bool {
        self.norm == 0.0
    }
}

/// Text-to-vector capability. Implementations are loaded once and shared
/// read-only across requests.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Unresolvable text yields a zero-norm vector, never an error.
    /// Errors are reserved for backend failures.
    async fn embed(&self, text: &str) -> Result<EmbeddedText, EmbeddingError>;
}

pub type SharedEmbedder = Arc<dyn TextEmbedder>;

// ==============================================================================
// Static word vectors (GloVe / word2vec text format)
// ==============================================================================

/// Phrase embeddings from a static word-vector table. A phrase vector is the
/// mean of its resolved token vectors.
pub struct WordVectorEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    dimension: usize,
}

impl WordVectorEmbedder {
    pub fn load(path: &Path) -> Result<Self, EmbeddingError> {
        if !path.exists() {
            return Err(EmbeddingError::ModelNotFound(path.to_path_buf()));
        }

        let file = File::open(path)
            .map_err(|e| EmbeddingError::ModelLoad(format!("{}: {}", path.display(), e)))?;
        let embedder = Self::from_reader(BufReader::new(file))?;

        info!(
            "Loaded {} word vectors ({} dimensions) from {}",
            embedder.vocabulary_size(),
            embedder.dimension,
            path.display()
        );

        Ok(embedder)
    }

    /// Parse `word v1 v2 ... vn` lines. An optional `count dim` header line is
    /// accepted; without one the first line fixes the dimension. Fields are
    /// separated by single spaces and the word is everything before the last
    /// `dim` fields, so words made of other whitespace survive. Lines that do
    /// not fit the dimension are skipped.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, EmbeddingError> {
        let mut vectors = HashMap::new();
        let mut dimension: Option<usize> = None;

        for (line_idx, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| EmbeddingError::ModelLoad(e.to_string()))?;
            let line = line.trim_end_matches([' ', '\r']);
            if line.trim().is_empty() {
                continue;
            }

            if line_idx == 0 {
                if let Some(dim) = parse_header(line) {
                    dimension = Some(dim);
                    continue;
                }
            }

            let dim = *dimension.get_or_insert_with(|| {
                line.split(' ').filter(|field| !field.is_empty()).count().saturating_sub(1)
            });

            match parse_vector_line(line, dim) {
                Some((word, vector)) => {
                    vectors.entry(word.to_lowercase()).or_insert(vector);
                }
                None => warn!("Skipping malformed word vector on line {}", line_idx + 1),
            }
        }

        let dimension = match dimension {
            Some(dim) if !vectors.is_empty() => dim,
            _ => return Err(EmbeddingError::ModelLoad("no word vectors found".to_string())),
        };

        Ok(Self { vectors, dimension })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectors.len()
    }

    pub fn embed_text(&self, text: &str) -> EmbeddedText {
        let mut sum = vec![0.0f32; self.dimension];
        let mut resolved = 0usize;

        for token in tokenize(text) {
            if let Some(vector) = self.vectors.get(&token) {
                for (acc, value) in sum.iter_mut().zip(vector) {
                    *acc += value;
                }
                resolved += 1;
            }
        }

        if resolved == 0 {
            return EmbeddedText::zero(self.dimension);
        }

        for value in &mut sum {
            *value /= resolved as f32;
        }

        EmbeddedText::new(sum)
    }
}

#[async_trait]
impl TextEmbedder for WordVectorEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddedText, EmbeddingError> {
        Ok(self.embed_text(text))
    }
}

/// `count dim` header as written by word2vec and fastText.
fn parse_header(line: &str) -> Option<usize> {
    let mut fields = line.split_whitespace();
    let (Some(count), Some(dim), None) = (fields.next(), fields.next(), fields.next()) else {
        return None;
    };
    count.parse::<usize>().ok()?;
    dim.parse::<usize>().ok().filter(|&dim| dim > 0)
}

fn parse_vector_line(line: &str, dim: usize) -> Option<(&str, Vec<f32>)> {
    if dim == 0 {
        return None;
    }

    let mut fields: Vec<&str> = line.rsplitn(dim + 1, ' ').collect();
    if fields.len() != dim + 1 {
        return None;
    }

    let word = fields.pop()?;
    // extra values would otherwise be folded into the word
    let spills_values = word
        .rsplit(' ')
        .next()
        .is_some_and(|last| word.contains(' ') && last.parse::<f32>().is_ok());
    if word.is_empty() || spills_values {
        return None;
    }

    let vector = fields
        .iter()
        .rev()
        .map(|value| value.parse::<f32>())
        .collect::<Result<Vec<f32>, _>>()
        .ok()?;

    Some((word, vector))
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

// ==============================================================================
// Remote embeddings (OpenAI-compatible API)
// ==============================================================================

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

pub struct RemoteEmbedder {
    http_client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl RemoteEmbedder {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http_client: Client::new(),
            base_url: config.embedding_api_url.trim_end_matches('/').to_string(),
            api_key: config.embedding_api_key.clone(),
            model: config.embedding_model.clone(),
        }
    }
}

#[async_trait]
impl TextEmbedder for RemoteEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddedText, EmbeddingError> {
        if text.trim().is_empty() {
            return Ok(EmbeddedText::zero(0));
        }

        let url = format!("{}/v1/embeddings", self.base_url);
        debug!("Requesting embedding from {}", url);

        let response = self.http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest { model: &self.model, input: text })
            .send()
            .await
            .map_err(|e| EmbeddingError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Unavailable(format!(
                "Embedding API error ({}): {}",
                status, error_text
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        body.data
            .into_iter()
            .next()
            .map(|data| EmbeddedText::new(data.embedding))
            .ok_or_else(|| EmbeddingError::InvalidResponse("empty data array".to_string()))
    }
}

// ==============================================================================
// Per-request memo
// ==============================================================================

/// Embeds each distinct string once for the lifetime of a single request.
pub struct EmbeddingCache<'a> {
    embedder: &'a dyn TextEmbedder,
    cache: HashMap<String, Arc<EmbeddedText>>,
}

impl<'a> EmbeddingCache<'a> {
    pub fn new(embedder: &'a dyn TextEmbedder) -> Self {
        Self {
            embedder,
            cache: HashMap::new(),
        }
    }

    pub async fn get(&mut self, text: &str) -> Result<Arc<EmbeddedText>, EmbeddingError> {
        if let Some(embedded) = self.cache.get(text) {
            return Ok(Arc::clone(embedded));
        }

        let embedded = Arc::new(self.embedder.embed(text).await?);
        self.cache.insert(text.to_string(), Arc::clone(&embedded));
        Ok(embedded)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Build the process-wide embedder selected by configuration.
pub fn load_embedder(config: &AppConfig) -> Result<SharedEmbedder, EmbeddingError> {
    match config.embedding_backend {
        EmbeddingBackend::WordVectors => {
            let embedder = WordVectorEmbedder::load(Path::new(&config.word_vectors_path))?;
            Ok(Arc::new(embedder))
        }
        EmbeddingBackend::Remote => {
            info!("Using remote embedding model {} at {}", config.embedding_model, config.embedding_api_url);
            Ok(Arc::new(RemoteEmbedder::new(config)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use assert_matches::assert_matches;

    const VECTORS: &str = "\
4 3
heart 1.0 0.0 0.0
disease 0.0 1.0 0.0
cardiology 0.9 0.1 0.0
Diabetes 0.0 0.0 1.0
";

    #[test]
    fn test_from_reader_accepts_header_line() {
        let embedder = WordVectorEmbedder::from_reader(Cursor::new(VECTORS)).unwrap();
        assert_eq!(embedder.dimension(), 3);
        assert_eq!(embedder.vocabulary_size(), 4);
    }

    #[test]
    fn test_from_reader_without_header_skips_malformed_lines() {
        let text = "heart 1.0 0.0\nbroken x y\n\ndisease 0.0 1.0\n";
        let embedder = WordVectorEmbedder::from_reader(Cursor::new(text)).unwrap();
        assert_eq!(embedder.dimension(), 2);
        assert_eq!(embedder.vocabulary_size(), 2);
    }

    #[test]
    fn test_from_reader_keeps_whitespace_words() {
        let text = "the 0.1 0.2 0.3\n\u{a0} 0.4 0.5 0.6\nheart 1.0 0.0 0.0\n";
        let embedder = WordVectorEmbedder::from_reader(Cursor::new(text)).unwrap();

        assert_eq!(embedder.dimension(), 3);
        assert_eq!(embedder.vocabulary_size(), 3);
        assert_eq!(embedder.embed_text("heart").vector(), &[1.0f32, 0.0, 0.0]);
    }

    #[test]
    fn test_from_reader_skips_lines_with_wrong_dimension() {
        let text = "heart 1.0 0.0\ndisease 0.0 1.0 0.5\nskin 0.5\nkidney 0.0 1.0\n";
        let embedder = WordVectorEmbedder::from_reader(Cursor::new(text)).unwrap();

        assert_eq!(embedder.dimension(), 2);
        assert_eq!(embedder.vocabulary_size(), 2);
        assert!(embedder.embed_text("disease").is_degenerate());
        assert!(embedder.embed_text("skin").is_degenerate());
    }

    #[test]
    fn test_from_reader_rejects_file_without_matching_lines() {
        let text = "2 3\nheart 1.0 0.0\ndisease 0.0 1.0\n";
        assert_matches!(
            WordVectorEmbedder::from_reader(Cursor::new(text)).err(),
            Some(EmbeddingError::ModelLoad(_))
        );
    }

    #[test]
    fn test_from_reader_rejects_empty_file() {
        assert_matches!(
            WordVectorEmbedder::from_reader(Cursor::new("")).err(),
            Some(EmbeddingError::ModelLoad(_))
        );
    }

    #[test]
    fn test_phrase_vector_is_token_mean() {
        let embedder = WordVectorEmbedder::from_reader(Cursor::new(VECTORS)).unwrap();
        let embedded = embedder.embed_text("Heart disease");
        assert_eq!(embedded.vector(), &[0.5f32, 0.5, 0.0]);
        assert!(!embedded.is_degenerate());
    }

    #[test]
    fn test_unknown_and_empty_text_are_degenerate() {
        let embedder = WordVectorEmbedder::from_reader(Cursor::new(VECTORS)).unwrap();
        assert!(embedder.embed_text("").is_degenerate());
        assert!(embedder.embed_text("xyzzy plugh").is_degenerate());
        assert_eq!(embedder.embed_text("xyzzy").dimension(), 3);
    }

    #[test]
    fn test_vocabulary_lookup_is_case_insensitive() {
        let embedder = WordVectorEmbedder::from_reader(Cursor::new(VECTORS)).unwrap();
        assert_eq!(embedder.embed_text("diabetes").vector(), &[0.0f32, 0.0, 1.0]);
    }

    #[test]
    fn test_embedded_text_norm() {
        assert_eq!(EmbeddedText::new(vec![3.0, 4.0]).norm(), 5.0);
        assert!(EmbeddedText::new(vec![]).is_degenerate());
        assert!(EmbeddedText::new(vec![f32::NAN, 1.0]).is_degenerate());
    }

    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextEmbedder for CountingEmbedder {
        async fn embed(&self, text: &str) -> Result<EmbeddedText, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(EmbeddedText::new(vec![text.len() as f32, 1.0]))
        }
    }

    #[tokio::test]
    async fn test_cache_embeds_each_string_once() {
        let embedder = CountingEmbedder { calls: AtomicUsize::new(0) };
        let mut cache = EmbeddingCache::new(&embedder);

        let first = cache.get("cardiology").await.unwrap();
        let second = cache.get("cardiology").await.unwrap();
        cache.get("neurology").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.len(), 2);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_load_missing_file_is_model_not_found() {
        let config = AppConfig {
            word_vectors_path: "/nonexistent/vectors.txt".to_string(),
            ..AppConfig::default()
        };
        assert_matches!(load_embedder(&config).err(), Some(EmbeddingError::ModelNotFound(_)));
    }
}
