pub mod fastembed_embedder;
pub mod hashing_embedder;
pub mod huggingface_embedder;
pub mod index;

pub use fastembed_embedder::FastEmbedEmbedder;
pub use hashing_embedder::HashingEmbedder;
pub use huggingface_embedder::HuggingFaceEmbedder;
pub use index::{FlatL2Index, Neighbor};

use crate::config::{Config, EmbeddingProvider};
use crate::error::{ApiError, Result};

/// The embedding backend the service was configured with.
#[derive(Debug, Clone)]
pub enum Embedder {
    FastEmbed(FastEmbedEmbedder),
    Hashing(HashingEmbedder),
    HuggingFace(HuggingFaceEmbedder),
}

impl Embedder {
    pub fn from_config(config: &Config) -> Result<Self> {
        match config.embedding_provider {
            EmbeddingProvider::FastEmbed => Ok(Self::FastEmbed(FastEmbedEmbedder::new(config)?)),
            EmbeddingProvider::Hashing => Ok(Self::Hashing(HashingEmbedder::new(
                config.embedding_dimensions,
            )?)),
            EmbeddingProvider::HuggingFace => {
                Ok(Self::HuggingFace(HuggingFaceEmbedder::new(config)?))
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::FastEmbed(embedder) => embedder.model_name(),
            Self::Hashing(_) => "feature-hashing",
            Self::HuggingFace(embedder) => embedder.model_name(),
        }
    }

    pub async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        match self {
            Self::FastEmbed(embedder) => embedder.encode(text).await,
            Self::Hashing(embedder) => Ok(embedder.encode(text)),
            Self::HuggingFace(embedder) => embedder.encode(text).await,
        }
    }

    pub async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        match self {
            Self::FastEmbed(embedder) => embedder.encode_batch(texts).await,
            Self::Hashing(embedder) => Ok(embedder.encode_batch(texts)),
            Self::HuggingFace(embedder) => embedder.encode_batch(texts).await,
        }
    }

    /// Embed `texts` and load them into a fresh index, one row per text.
    pub async fn build_index(&self, texts: &[String]) -> Result<FlatL2Index> {
        let embeddings = self.encode_batch(texts).await?;
        let dimensions = match embeddings.first() {
            Some(first) => first.len(),
            None => match self {
                Self::FastEmbed(embedder) => embedder.dimensions(),
                Self::Hashing(embedder) => embedder.dimensions(),
                Self::HuggingFace(_) => 0,
            },
        };

        if embeddings.len() != texts.len() {
            return Err(ApiError::ModelError(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }

        FlatL2Index::from_vectors(dimensions, &embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_index_matches_input_order() {
        let embedder = Embedder::Hashing(HashingEmbedder::new(64).unwrap());
        let texts = vec![
            "dragons and castles".to_string(),
            "rockets and planets".to_string(),
        ];

        let index = embedder.build_index(&texts).await.unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.dimensions(), 64);

        let query = embedder.encode("rockets and planets").await.unwrap();
        let hits = index.search(&query, 1).unwrap();
        assert_eq!(hits[0].position, 1);
    }

    #[tokio::test]
    async fn test_build_index_from_nothing_is_empty() {
        let embedder = Embedder::Hashing(HashingEmbedder::new(8).unwrap());
        let index = embedder.build_index(&[]).await.unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_from_config_builds_hashing() {
        let config = Config {
            embedding_provider: EmbeddingProvider::Hashing,
            ..Config::default()
        };
        let embedder = Embedder::from_config(&config).unwrap();
        assert_eq!(embedder.name(), "feature-hashing");
    }

    #[test]
    fn test_from_config_rejects_unknown_fastembed_model() {
        let config = Config {
            fastembed_model_name: "not-a-model".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            Embedder::from_config(&config),
            Err(ApiError::ModelLoadError(_))
        ));
    }
}
