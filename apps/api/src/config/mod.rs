use crate::error::{ApiError, Result};
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_MODEL_NAME: &str = "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2";
pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_FASTEMBED_MODEL: &str = "paraphrase-multilingual-MiniLM-L12-v2";
pub const DEFAULT_FASTEMBED_CACHE_DIR: &str = ".fastembed_cache";
pub const MAX_RETRY_ATTEMPTS: u32 = 10;

/// Which embedding backend turns descriptions and queries into vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    /// Local ONNX sentence model through fastembed.
    FastEmbed,
    /// Local feature hashing, no model or network required.
    Hashing,
    /// HuggingFace inference API.
    HuggingFace,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub dataset_path: PathBuf,
    pub top_k: usize,
    pub embedding_provider: EmbeddingProvider,
    pub embedding_dimensions: usize,
    pub prebuild_catalog_index: bool,
    pub fastembed_model_name: String,
    pub fastembed_cache_dir: PathBuf,
    pub huggingface_api_key: Option<String>,
    pub huggingface_base_url: String,
    pub huggingface_model_name: String,
    pub huggingface_timeout_seconds: u64,
    pub huggingface_retry_attempts: u32,
    pub huggingface_retry_delay_ms: u64,
    pub huggingface_concurrency: usize,
}

impl Config {
    /// Load configuration from defaults overridden by `APP_*` environment variables.
    pub fn load() -> Result<Self> {
        let settings = Self::builder()?
            .add_source(config::Environment::with_prefix("APP").try_parsing(true))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(config::Config::builder()
            .set_default("host", "127.0.0.1")?
            .set_default("port", 8000_i64)?
            .set_default("dataset_path", "data/books.csv")?
            .set_default("top_k", 10_i64)?
            .set_default("embedding_provider", "fastembed")?
            .set_default("embedding_dimensions", 384_i64)?
            .set_default("prebuild_catalog_index", true)?
            .set_default("fastembed_model_name", DEFAULT_FASTEMBED_MODEL)?
            .set_default("fastembed_cache_dir", DEFAULT_FASTEMBED_CACHE_DIR)?
            .set_default("huggingface_base_url", DEFAULT_BASE_URL)?
            .set_default("huggingface_model_name", DEFAULT_MODEL_NAME)?
            .set_default("huggingface_timeout_seconds", 30_i64)?
            .set_default("huggingface_retry_attempts", 3_i64)?
            .set_default("huggingface_retry_delay_ms", 500_i64)?
            .set_default("huggingface_concurrency", 4_i64)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(ApiError::ConfigError("top_k must be at least 1".to_string()));
        }
        if self.embedding_dimensions == 0 {
            return Err(ApiError::ConfigError(
                "embedding_dimensions must be at least 1".to_string(),
            ));
        }
        if self.huggingface_retry_attempts > MAX_RETRY_ATTEMPTS {
            return Err(ApiError::ConfigError(format!(
                "huggingface_retry_attempts must be at most {}",
                MAX_RETRY_ATTEMPTS
            )));
        }
        if self.huggingface_concurrency == 0 {
            return Err(ApiError::ConfigError(
                "huggingface_concurrency must be at least 1".to_string(),
            ));
        }
        if self.embedding_provider == EmbeddingProvider::HuggingFace
            && self
                .huggingface_api_key
                .as_deref()
                .map_or(true, |key| key.trim().is_empty())
        {
            return Err(ApiError::ConfigError(
                "APP_HUGGINGFACE_API_KEY must be set for the huggingface provider".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            dataset_path: PathBuf::from("data/books.csv"),
            top_k: 10,
            embedding_provider: EmbeddingProvider::FastEmbed,
            embedding_dimensions: 384,
            prebuild_catalog_index: true,
            fastembed_model_name: DEFAULT_FASTEMBED_MODEL.to_string(),
            fastembed_cache_dir: PathBuf::from(DEFAULT_FASTEMBED_CACHE_DIR),
            huggingface_api_key: None,
            huggingface_base_url: DEFAULT_BASE_URL.to_string(),
            huggingface_model_name: DEFAULT_MODEL_NAME.to_string(),
            huggingface_timeout_seconds: 30,
            huggingface_retry_attempts: 3,
            huggingface_retry_delay_ms: 500,
            huggingface_concurrency: 4,
        }
    }
}
