use async_trait::async_trait;
use fxhash::hash64;

use crate::normalize::l2_normalize_in_place;
use crate::{Embedder, SemanticConfig, SemanticError};

/// Weight given to adjacent-word features relative to single words.
const BIGRAM_WEIGHT: f32 = 0.5;

/// Deterministic bag-of-words embedder based on the hashing trick.
///
/// Every lowercase word (and every adjacent word pair) is hashed into one of
/// `dimension` buckets with a hash-derived sign. Texts sharing vocabulary land
/// close together under cosine similarity, identical texts produce identical
/// vectors, and text without any word characters produces the zero vector.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    model_name: String,
    dimension: usize,
    normalize: bool,
}

impl HashingEmbedder {
    pub fn new(dimension: usize, normalize: bool) -> Result<Self, SemanticError> {
        if dimension == 0 {
            return Err(SemanticError::InvalidConfig(
                "dimension must be >= 1".into(),
            ));
        }
        Ok(Self {
            model_name: format!("feature-hashing-{dimension}"),
            dimension,
            normalize,
        })
    }

    pub fn from_config(cfg: &SemanticConfig) -> Result<Self, SemanticError> {
        Self::new(cfg.dimension, cfg.normalize)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Synchronous core shared by [`Embedder::embed`] and the batch path.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dimension];
        let words = tokenize(text);

        for word in &words {
            self.accumulate(&mut v, word, 1.0);
        }
        for pair in words.windows(2) {
            let feature = format!("{} {}", pair[0], pair[1]);
            self.accumulate(&mut v, &feature, BIGRAM_WEIGHT);
        }

        if self.normalize {
            l2_normalize_in_place(&mut v);
        }
        v
    }

    fn accumulate(&self, v: &mut [f32], feature: &str, weight: f32) {
        let h = hash64(feature.as_bytes());
        let idx = (h % self.dimension as u64) as usize;
        // Top bit picks the sign so collisions tend to cancel out.
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        v[idx] += sign * weight;
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl Embedder for HashingEmbedder {
    fn name(&self) -> &str {
        &self.model_name
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        Ok(self.embed_text(text))
    }

    fn supports_batch(&self) -> bool {
        true
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, SemanticError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::l2_norm;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>() / (l2_norm(a) * l2_norm(b))
    }

    #[test]
    fn same_text_same_vector() {
        let e = HashingEmbedder::new(64, true).unwrap();
        assert_eq!(e.embed_text("Deep Learning Basics"), e.embed_text("Deep Learning Basics"));
    }

    #[test]
    fn case_and_punctuation_are_ignored() {
        let e = HashingEmbedder::new(64, true).unwrap();
        assert_eq!(e.embed_text("machine learning!"), e.embed_text("Machine, LEARNING"));
    }

    #[test]
    fn vectors_have_configured_dimension_and_unit_length() {
        let e = HashingEmbedder::new(128, true).unwrap();
        let v = e.embed_text("cross-language information retrieval");
        assert_eq!(v.len(), 128);
        assert!((l2_norm(&v) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn text_without_words_is_zero_vector() {
        let e = HashingEmbedder::new(32, true).unwrap();
        let v = e.embed_text("  ... !!! ");
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn shared_vocabulary_scores_higher() {
        let e = HashingEmbedder::new(384, true).unwrap();
        let query = e.embed_text("machine translation");
        let related = e.embed_text("Query Translation Methods use machine translation");
        let unrelated = e.embed_text("Evaluation metrics such as precision and recall");
        assert!(cosine(&query, &related) > cosine(&query, &unrelated));
    }

    #[test]
    fn unicode_words_are_tokenized() {
        let e = HashingEmbedder::new(64, true).unwrap();
        let v = e.embed_text("मशीन अनुवाद");
        assert!(v.iter().any(|&x| x != 0.0));
    }

    #[test]
    fn zero_dimension_rejected() {
        assert!(HashingEmbedder::new(0, true).is_err());
    }

    #[tokio::test]
    async fn batch_matches_single_calls() {
        let e = HashingEmbedder::new(64, true).unwrap();
        let texts = vec!["alpha beta".to_string(), "gamma".to_string()];
        let batch = e.embed_batch(&texts).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0], e.embed("alpha beta").await.unwrap());
        assert_eq!(batch[1], e.embed("gamma").await.unwrap());
    }
}
