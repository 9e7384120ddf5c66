//! Local sentence embeddings through fastembed (ONNX runtime).
//!
//! The model is downloaded into the cache directory on first start and
//! loaded once. fastembed's `embed` needs `&mut self`, so the model sits
//! behind a mutex and inference runs on the blocking thread pool.

use crate::config::Config;
use crate::error::{ApiError, Result};
use fastembed::{InitOptions, TextEmbedding};
use log::info;
use std::{
    fmt,
    sync::{Arc, Mutex},
};

#[derive(Clone)]
pub struct FastEmbedEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
    model_name: String,
    dimensions: usize,
}

impl fmt::Debug for FastEmbedEmbedder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FastEmbedEmbedder")
            .field("model_name", &self.model_name)
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

impl FastEmbedEmbedder {
    pub fn new(config: &Config) -> Result<Self> {
        let model_enum = parse_model_name(&config.fastembed_model_name)?;

        std::fs::create_dir_all(&config.fastembed_cache_dir).map_err(|e| {
            ApiError::ModelLoadError(format!(
                "Failed to create model cache directory {}: {}",
                config.fastembed_cache_dir.display(),
                e
            ))
        })?;

        info!(
            "Loading fastembed model {} (cache: {})",
            config.fastembed_model_name,
            config.fastembed_cache_dir.display()
        );

        let options = InitOptions::new(model_enum)
            .with_cache_dir(config.fastembed_cache_dir.clone())
            .with_show_download_progress(true);

        let mut model = TextEmbedding::try_new(options)
            .map_err(|e| ApiError::ModelLoadError(e.to_string()))?;

        let dimensions = measure_dimensions(&mut model)?;
        info!("fastembed model ready, {} dimensions", dimensions);

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            model_name: config.fastembed_model_name.clone(),
            dimensions,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        self.encode_batch(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| ApiError::ModelError("No embedding returned".to_string()))
    }

    pub async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        let texts = texts.to_vec();

        tokio::task::spawn_blocking(move || {
            let mut model = model.lock().map_err(|e| {
                ApiError::ModelError(format!("Failed to acquire model lock: {}", e))
            })?;
            model
                .embed(texts, None)
                .map_err(|e| ApiError::ModelError(e.to_string()))
        })
        .await
        .map_err(|e| ApiError::InternalError(format!("Embedding task failed: {}", e)))?
    }
}

/// Map a configured model name onto fastembed's model enum.
pub(crate) fn parse_model_name(name: &str) -> Result<fastembed::EmbeddingModel> {
    match name.to_lowercase().as_str() {
        "paraphrase-multilingual-minilm-l12-v2"
        | "sentence-transformers/paraphrase-multilingual-minilm-l12-v2" => {
            Ok(fastembed::EmbeddingModel::ParaphraseMLMiniLML12V2)
        }
        "paraphrase-multilingual-minilm-l12-v2-q" => {
            Ok(fastembed::EmbeddingModel::ParaphraseMLMiniLML12V2Q)
        }
        "all-minilm-l6-v2" | "sentence-transformers/all-minilm-l6-v2" => {
            Ok(fastembed::EmbeddingModel::AllMiniLML6V2)
        }
        "bge-small-en-v1.5" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
        _ => Err(ApiError::ModelLoadError(format!(
            "Unknown fastembed model: {}. Supported models: paraphrase-multilingual-MiniLM-L12-v2 (add -q for quantized), all-MiniLM-L6-v2, bge-small-en-v1.5",
            name
        ))),
    }
}

fn measure_dimensions(model: &mut TextEmbedding) -> Result<usize> {
    let sample = model
        .embed(vec!["test"], None)
        .map_err(|e| ApiError::ModelLoadError(format!("Failed to measure dimensions: {}", e)))?;

    sample
        .first()
        .map(Vec::len)
        .ok_or_else(|| ApiError::ModelLoadError("Model returned no embedding".to_string()))
}
