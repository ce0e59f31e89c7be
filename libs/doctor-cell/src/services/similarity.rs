use crate::services::embedding::EmbeddedText;

/// Cosine similarity between two embeddings. Degenerate (zero-norm) inputs and
/// mismatched dimensions score exactly 0.0; no clamping is applied otherwise.
pub fn cosine_similarity(a: &EmbeddedText, b: &EmbeddedText) -> f64 {
    if a.is_degenerate() || b.is_degenerate() || a.dimension() != b.dimension() {
        return 0.0;
    }

    let dot: f64 = a
        .vector()
        .iter()
        .zip(b.vector())
        .map(|(&x, &y)| x as f64 * y as f64)
        .sum();

    dot / (a.norm() * b.norm())
}

/// Lexical match between a normalized condition and a lowercased
/// specialization: the condition occurs inside the specialization, or any
/// whitespace-separated word of the specialization occurs inside the condition.
/// Both checks are plain substring tests, so "heart" matches "heart disease".
pub fn keyword_overlap(condition: &str, specialization: &str) -> bool {
    specialization.contains(condition)
        || specialization
            .split_whitespace()
            .any(|word| condition.contains(word))
}
