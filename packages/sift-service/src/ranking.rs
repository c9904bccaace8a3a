use std::sync::Arc;

use sift_domain::{MIN_QUERY_CHARS, RankedChunk, TextChunk};

use crate::{EmbeddingProvider, Error, Result};

/// Scores fragments against a query with one embedding batch.
pub struct Ranker {
	embedding: Arc<dyn EmbeddingProvider>,
}
impl Ranker {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>) -> Self {
		Self { embedding }
	}

	/// Returns one scored fragment per non-blank input fragment, sorted by descending score.
	/// Equal scores keep their input order. All-or-nothing: any embedding fault fails the call.
	pub async fn rank(&self, fragments: &[TextChunk], query: &str) -> Result<Vec<RankedChunk>> {
		let query = query.trim();

		if fragments.is_empty() {
			return Err(Error::InvalidInput { message: "No fragments to rank.".to_string() });
		}
		if query.chars().count() < MIN_QUERY_CHARS {
			return Err(Error::InvalidInput {
				message: format!("Query must be at least {MIN_QUERY_CHARS} characters."),
			});
		}

		let filtered: Vec<&TextChunk> =
			fragments.iter().filter(|chunk| !chunk.text().trim().is_empty()).collect();

		if filtered.is_empty() {
			return Err(Error::InvalidInput {
				message: "No fragment has non-empty text.".to_string(),
			});
		}

		let mut texts = Vec::with_capacity(filtered.len() + 1);

		texts.push(query.to_string());
		texts.extend(filtered.iter().map(|chunk| chunk.text().to_string()));

		let vectors = self.embedding.embed(&texts).await?;

		if vectors.len() != texts.len() {
			return Err(Error::ProcessingFailed {
				message: format!(
					"Embedding service returned {} vectors for {} inputs.",
					vectors.len(),
					texts.len()
				),
			});
		}

		let Some((query_vec, fragment_vecs)) = vectors.split_first() else {
			return Err(Error::ProcessingFailed {
				message: "Embedding service returned no vectors.".to_string(),
			});
		};

		if query_vec.is_empty() {
			return Err(Error::ProcessingFailed {
				message: "Embedding service returned an empty query vector.".to_string(),
			});
		}

		let mut ranked = Vec::with_capacity(filtered.len());

		for (chunk, vector) in filtered.into_iter().zip(fragment_vecs) {
			if vector.len() != query_vec.len() {
				return Err(Error::ProcessingFailed {
					message: format!(
						"Embedding dimension mismatch: expected {}, got {}.",
						query_vec.len(),
						vector.len()
					),
				});
			}

			let score = relevance(query_vec, vector).ok_or_else(|| Error::ProcessingFailed {
				message: format!("Non-finite relevance score for chunk {}.", chunk.chunk_id()),
			})?;

			ranked.push(RankedChunk::new(chunk.clone(), score)?);
		}

		// Stable, so ties keep their input order.
		ranked.sort_by(|a, b| b.relevance_score().total_cmp(&a.relevance_score()));

		tracing::debug!(fragments = ranked.len(), "Fragments ranked.");

		Ok(ranked)
	}
}

/// Cosine similarity of unit vectors remapped from [-1, 1] to [0, 1].
fn relevance(query: &[f32], fragment: &[f32]) -> Option<f32> {
	let similarity: f32 = query.iter().zip(fragment).map(|(q, f)| q * f).sum();

	if !similarity.is_finite() {
		return None;
	}

	Some(((similarity + 1.0) / 2.0).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn remaps_similarity_range() {
		assert_eq!(relevance(&[1.0, 0.0], &[1.0, 0.0]), Some(1.0));
		assert_eq!(relevance(&[1.0, 0.0], &[-1.0, 0.0]), Some(0.0));
		assert_eq!(relevance(&[1.0, 0.0], &[0.0, 1.0]), Some(0.5));
	}

	#[test]
	fn clamps_overshoot_and_rejects_nan() {
		assert_eq!(relevance(&[1.000_001, 0.0], &[1.000_001, 0.0]), Some(1.0));
		assert_eq!(relevance(&[f32::NAN], &[1.0]), None);
	}
}
