use std::time::Duration;

use reqwest::{Client, header::HeaderMap};
use serde_json::Value;

use crate::{Error, Result};

/// Client for an OpenAI-compatible embeddings endpoint. Built once and reused for every batch.
pub struct HttpEmbedding {
	cfg: sift_config::EmbeddingProviderConfig,
	client: Client,
	headers: HeaderMap,
}
impl HttpEmbedding {
	pub fn new(cfg: &sift_config::EmbeddingProviderConfig) -> Result<Self> {
		let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
		let headers = crate::auth_headers(&cfg.api_key, &cfg.default_headers)?;

		Ok(Self { cfg: cfg.clone(), client, headers })
	}

	/// Embeds `texts` in one request. Vectors come back in input order and unit-normalized.
	pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
		if texts.is_empty() {
			return Ok(Vec::new());
		}

		let url = format!("{}{}", self.cfg.api_base, self.cfg.path);
		let mut body = serde_json::json!({ "model": self.cfg.model, "input": texts });

		if let Some(dimensions) = self.cfg.dimensions {
			body["dimensions"] = Value::from(dimensions);
		}

		tracing::debug!(
			provider = %self.cfg.provider_id,
			model = %self.cfg.model,
			inputs = texts.len(),
			"Requesting embeddings."
		);

		let res = self.client.post(url).headers(self.headers.clone()).json(&body).send().await?;
		let json: Value = res.error_for_status()?.json().await?;
		let mut vectors = parse_embedding_response(json)?;

		vectors.iter_mut().for_each(|vector| normalize(vector));

		Ok(vectors)
	}
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let data = json.get("data").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Embedding response is missing data array.".to_string() }
	})?;
	let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item.get("embedding").and_then(|v| v.as_array()).ok_or_else(|| {
			Error::InvalidResponse {
				message: "Embedding item missing embedding array.".to_string(),
			}
		})?;
		let mut vec = Vec::with_capacity(embedding.len());

		for value in embedding {
			let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
				message: "Embedding value must be numeric.".to_string(),
			})?;

			vec.push(number as f32);
		}

		indexed.push((index, vec));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}

fn normalize(vector: &mut [f32]) {
	let norm = vector.iter().map(|value| value * value).sum::<f32>().sqrt();

	if norm > 0.0 && norm.is_finite() {
		vector.iter_mut().for_each(|value| *value /= norm);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_embeddings_in_index_order() {
		let json = serde_json::json!({
			"data": [
				{ "index": 1, "embedding": [2.0, 3.0] },
				{ "index": 0, "embedding": [0.5, 1.5] }
			]
		});
		let parsed = parse_embedding_response(json).expect("parse failed");

		assert_eq!(parsed.len(), 2);
		assert_eq!(parsed[0], vec![0.5, 1.5]);
		assert_eq!(parsed[1], vec![2.0, 3.0]);
	}

	#[test]
	fn rejects_missing_data_array() {
		let err = parse_embedding_response(serde_json::json!({ "object": "list" })).unwrap_err();

		assert!(matches!(err, Error::InvalidResponse { .. }));
	}

	#[test]
	fn normalizes_to_unit_length() {
		let mut vector = vec![3.0, 4.0];

		normalize(&mut vector);

		assert!((vector[0] - 0.6).abs() < 1e-6);
		assert!((vector[1] - 0.8).abs() < 1e-6);

		let mut zero = vec![0.0, 0.0];

		normalize(&mut zero);

		assert_eq!(zero, vec![0.0, 0.0]);
	}
}
