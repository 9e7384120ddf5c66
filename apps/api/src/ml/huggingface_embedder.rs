use crate::config::Config;
use crate::error::{ApiError, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const DEFAULT_CONNECTION_TIMEOUT_SECONDS: u64 = 15;
const BATCH_SIZE_LIMIT: usize = 8;
const MAX_TEXT_PREVIEW_LENGTH: usize = 100;

#[derive(Serialize)]
struct Request<'a> {
    inputs: &'a [String],
    options: Options,
}

#[derive(Serialize)]
struct Options {
    wait_for_model: bool,
    use_cache: bool,
}

/// Sentence embeddings from the HuggingFace inference API.
#[derive(Debug, Clone)]
pub struct HuggingFaceEmbedder {
    client: Client,
    api_key: String,
    model_url: String,
    model_name: String,
    retry_attempts: u32,
    retry_delay_ms: u64,
    concurrency: usize,
}

impl HuggingFaceEmbedder {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .huggingface_api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ApiError::ModelLoadError(
                    "Missing APP_HUGGINGFACE_API_KEY environment variable".to_string(),
                )
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.huggingface_timeout_seconds))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECTION_TIMEOUT_SECONDS))
            .pool_max_idle_per_host(config.huggingface_concurrency)
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .build()
            .map_err(|e| ApiError::InternalError(format!("Failed to create HTTP client: {}", e)))?;

        let model_url = format!(
            "{}/models/{}",
            config.huggingface_base_url.trim_end_matches('/'),
            config.huggingface_model_name
        );

        info!(
            "HuggingFace embedder using model {} (timeout {}s, {} retries)",
            config.huggingface_model_name,
            config.huggingface_timeout_seconds,
            config.huggingface_retry_attempts
        );

        Ok(Self {
            client,
            api_key,
            model_url,
            model_name: config.huggingface_model_name.clone(),
            retry_attempts: config.huggingface_retry_attempts.max(1),
            retry_delay_ms: config.huggingface_retry_delay_ms,
            concurrency: config.huggingface_concurrency.max(1),
        })
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.encode_batch(&[text.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| ApiError::ModelError("Model returned no embedding".to_string()))
    }

    /// Encode texts in chunks, keeping output order aligned with input order.
    pub async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            "Encoding {} texts in chunks of {}",
            texts.len(),
            BATCH_SIZE_LIMIT
        );

        let chunks: Vec<Vec<Vec<f32>>> = stream::iter(texts.chunks(BATCH_SIZE_LIMIT))
            .map(|chunk| self.encode_chunk(chunk))
            .buffered(self.concurrency)
            .try_collect()
            .await?;

        Ok(chunks.into_iter().flatten().collect())
    }

    async fn encode_chunk(&self, chunk: &[String]) -> Result<Vec<Vec<f32>>> {
        let inputs: Vec<String> = chunk.iter().map(|text| preprocess_text(text)).collect();

        if let Some(first) = inputs.first() {
            debug!("Encoding chunk starting with: {}", preview(first));
        }

        for attempt in 1..=self.retry_attempts {
            match self.request_embeddings(&inputs).await {
                Ok(embeddings) if embeddings.len() == inputs.len() => return Ok(embeddings),
                Ok(embeddings) => {
                    return Err(ApiError::ModelError(format!(
                        "Expected {} embeddings from model, got {}",
                        inputs.len(),
                        embeddings.len()
                    )));
                }
                Err(e) if attempt < self.retry_attempts => {
                    let delay_ms = backoff_delay_ms(self.retry_delay_ms, attempt);
                    warn!(
                        "HuggingFace request failed (attempt {}/{}): {}. Retrying in {}ms",
                        attempt, self.retry_attempts, e, delay_ms
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }

        Err(ApiError::ModelError(
            "All retry attempts failed when encoding text".to_string(),
        ))
    }

    async fn request_embeddings(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = Request {
            inputs,
            options: Options {
                wait_for_model: true,
                use_cache: true,
            },
        };

        let response = self
            .client
            .post(&self.model_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ApiError::ExternalServiceError(format!("HuggingFace API request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(self.status_error(status, &text));
        }

        let body: Value = response.json().await.map_err(|e| {
            ApiError::SerializationError(format!("Failed to parse HuggingFace response: {}", e))
        })?;

        parse_embeddings(&body)
    }

    fn status_error(&self, status: StatusCode, body: &str) -> ApiError {
        match status {
            StatusCode::NOT_FOUND => ApiError::ModelError(format!(
                "Model not found: {}. Please check the model name in your configuration.",
                self.model_name
            )),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::ModelError(
                "Authentication failed. Please check your HuggingFace API key.".to_string(),
            ),
            StatusCode::TOO_MANY_REQUESTS => {
                ApiError::ExternalServiceError("HuggingFace rate limit exceeded".to_string())
            }
            _ => ApiError::ExternalServiceError(format!(
                "HuggingFace API returned non-success status: {} - {}",
                status, body
            )),
        }
    }
}

fn preprocess_text(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        warn!("Sending blank text to HuggingFace");
    }
    trimmed.to_string()
}

/// First `MAX_TEXT_PREVIEW_LENGTH` characters, with "..." when cut short.
fn preview(text: &str) -> String {
    match text.char_indices().nth(MAX_TEXT_PREVIEW_LENGTH) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// Exponential backoff: `base_ms * 2^(attempt - 1)`, saturating at `u64::MAX`.
fn backoff_delay_ms(base_ms: u64, attempt: u32) -> u64 {
    base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)))
}

/// Accepts `[[f32; d]; n]` sentence embeddings, a bare `[f32; d]` for a single
/// input, or `[[[f32; d]; tokens]; n]` token embeddings which get mean pooled.
pub(crate) fn parse_embeddings(body: &Value) -> Result<Vec<Vec<f32>>> {
    let rows = body.as_array().ok_or_else(|| {
        ApiError::ModelError("Expected a JSON array of embeddings from model".to_string())
    })?;

    if rows.is_empty() {
        return Err(ApiError::ModelError(
            "Received empty array from model".to_string(),
        ));
    }

    if rows[0].is_number() {
        return Ok(vec![to_vector(body)?]);
    }

    rows.iter()
        .map(|row| match row.as_array() {
            Some(tokens) if tokens.first().map_or(false, Value::is_array) => mean_pool(tokens),
            Some(_) => to_vector(row),
            None => Err(ApiError::ModelError(
                "Unexpected embedding row in model response".to_string(),
            )),
        })
        .collect()
}

fn to_vector(value: &Value) -> Result<Vec<f32>> {
    let values = value
        .as_array()
        .ok_or_else(|| ApiError::ModelError("Embedding is not an array".to_string()))?;

    values
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| ApiError::ModelError("Embedding contains a non-number".to_string()))
        })
        .collect()
}

fn mean_pool(tokens: &[Value]) -> Result<Vec<f32>> {
    let vectors = tokens.iter().map(to_vector).collect::<Result<Vec<_>>>()?;
    let dimensions = vectors.first().map_or(0, Vec::len);

    if vectors.iter().any(|v| v.len() != dimensions) {
        return Err(ApiError::ModelError(
            "Token embeddings have inconsistent dimensions".to_string(),
        ));
    }

    let mut pooled = vec![0.0_f32; dimensions];
    for vector in &vectors {
        for (acc, x) in pooled.iter_mut().zip(vector) {
            *acc += x;
        }
    }
    let count = vectors.len() as f32;
    pooled.iter_mut().for_each(|x| *x /= count);
    Ok(pooled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_sentence_embeddings() {
        let parsed = parse_embeddings(&json!([[0.1, 0.2], [0.3, 0.4]])).unwrap();
        assert_eq!(parsed, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    }

    #[test]
    fn test_parse_single_flat_embedding() {
        let parsed = parse_embeddings(&json!([0.5, -0.5, 1.0])).unwrap();
        assert_eq!(parsed, vec![vec![0.5, -0.5, 1.0]]);
    }

    #[test]
    fn test_parse_token_embeddings_mean_pools() {
        let parsed = parse_embeddings(&json!([[[1.0, 2.0], [3.0, 4.0]]])).unwrap();
        assert_eq!(parsed, vec![vec![2.0, 3.0]]);
    }

    #[test]
    fn test_parse_rejects_bad_payloads() {
        assert!(parse_embeddings(&json!([])).is_err());
        assert!(parse_embeddings(&json!({"error": "loading"})).is_err());
        assert!(parse_embeddings(&json!([["a", "b"]])).is_err());
    }

    #[test]
    fn test_new_requires_api_key() {
        let config = Config::default();
        assert!(matches!(
            HuggingFaceEmbedder::new(&config),
            Err(ApiError::ModelLoadError(_))
        ));
    }

    #[test]
    fn test_model_url_is_built_from_config() {
        let config = Config {
            huggingface_api_key: Some("hf_test".to_string()),
            huggingface_base_url: "http://localhost:9999/".to_string(),
            ..Config::default()
        };
        let embedder = HuggingFaceEmbedder::new(&config).unwrap();
        assert_eq!(
            embedder.model_url,
            format!("http://localhost:9999/models/{}", config.huggingface_model_name)
        );
    }

    #[test]
    fn test_preprocess_keeps_blank_text_blank() {
        assert_eq!(preprocess_text("   "), "");
        assert_eq!(preprocess_text("  hello "), "hello");
    }

    #[test]
    fn test_preview_counts_characters_not_bytes() {
        // 100 two-byte characters fit exactly, so no ellipsis
        let exact = "é".repeat(MAX_TEXT_PREVIEW_LENGTH);
        assert_eq!(preview(&exact), exact);

        let long = "é".repeat(150);
        let shown = preview(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), MAX_TEXT_PREVIEW_LENGTH + 3);
    }

    #[test]
    fn test_backoff_doubles_and_saturates() {
        assert_eq!(backoff_delay_ms(500, 1), 500);
        assert_eq!(backoff_delay_ms(500, 3), 2000);
        assert_eq!(backoff_delay_ms(500, 64), u64::MAX);
        assert_eq!(backoff_delay_ms(500, u32::MAX), u64::MAX);
    }
}
