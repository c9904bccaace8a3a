use std::{path::Path, time::Duration};

use reqwest::{
	Client, StatusCode,
	header::HeaderMap,
	multipart::{Form, Part},
};
use serde_json::Value;

use sift_chunking::ChunkingConfig;
use sift_domain::TextChunk;

use crate::{Error, Result};

const TITLE_KINDS: [&str; 2] = ["Title", "Header"];

/// One element of a partition response.
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
	pub kind: String,
	pub text: String,
	pub page_number: Option<u32>,
}

/// Client for an Unstructured-style partition endpoint.
pub struct HttpExtraction {
	cfg: sift_config::ExtractionProviderConfig,
	chunking: ChunkingConfig,
	client: Client,
	headers: HeaderMap,
}
impl HttpExtraction {
	pub fn new(
		cfg: &sift_config::ExtractionProviderConfig,
		chunking: &sift_config::Chunking,
	) -> Result<Self> {
		let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
		let headers = crate::auth_headers(&cfg.api_key, &cfg.default_headers)?;
		let chunking = ChunkingConfig {
			max_chars: chunking.max_chars,
			min_meaningful_chars: chunking.min_meaningful_chars,
		};

		Ok(Self { cfg: cfg.clone(), chunking, client, headers })
	}

	/// Extracts the fragments of one document. The file is checked locally before upload so
	/// missing, non-PDF and encrypted files never reach the service.
	pub async fn extract(&self, path: &Path, document: &str) -> Result<Vec<TextChunk>> {
		let bytes = crate::pdf::preflight(path).await?;
		let file_name = path
			.file_name()
			.map(|name| name.to_string_lossy().into_owned())
			.unwrap_or_else(|| document.to_string());
		let part = Part::bytes(bytes).file_name(file_name).mime_str("application/pdf")?;
		let form = form_fields(&self.cfg)
			.into_iter()
			.fold(Form::new().part("files", part), |form, (name, value)| form.text(name, value));
		let url = format!("{}{}", self.cfg.api_base, self.cfg.path);
		let res =
			self.client.post(url).headers(self.headers.clone()).multipart(form).send().await?;

		if matches!(res.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE | StatusCode::UNPROCESSABLE_ENTITY)
		{
			return Err(Error::UnsupportedFormat {
				message: format!(
					"Invalid PDF format: extraction service rejected {document} with status {}.",
					res.status()
				),
			});
		}

		let json: Value = res.error_for_status()?.json().await?;
		let elements = parse_elements(json)?;

		tracing::debug!(document, elements = elements.len(), "Partition response received.");

		build_chunks(&elements, document, &self.chunking)
	}
}

/// Text fields of the partition request. Chunking options go out only when server-side
/// chunking is configured, since chunked output carries no title elements.
pub fn form_fields(cfg: &sift_config::ExtractionProviderConfig) -> Vec<(&'static str, String)> {
	let mut fields = vec![("strategy", cfg.strategy.clone())];

	if let Some(chunking_strategy) = &cfg.chunking_strategy {
		fields.push(("chunking_strategy", chunking_strategy.clone()));
		fields.push(("max_characters", cfg.max_characters.to_string()));
		fields.push(("combine_under_n_chars", cfg.combine_under_n_chars.to_string()));
	}

	fields
}

pub fn parse_elements(json: Value) -> Result<Vec<Element>> {
	let items = json.as_array().ok_or_else(|| Error::InvalidResponse {
		message: "Partition response must be an array of elements.".to_string(),
	})?;
	let mut elements = Vec::with_capacity(items.len());

	for item in items {
		let kind = item.get("type").and_then(|v| v.as_str()).unwrap_or("Unknown").to_string();
		let text = item.get("text").and_then(|v| v.as_str()).unwrap_or_default().to_string();
		let page_number = item
			.get("metadata")
			.and_then(|meta| meta.get("page_number"))
			.and_then(|v| v.as_u64())
			.and_then(|page| u32::try_from(page).ok())
			.filter(|page| *page >= 1);

		elements.push(Element { kind, text, page_number });
	}

	Ok(elements)
}

/// Turns partition elements into fragments. Each element inherits the most recent title or
/// header as its section title; titles are emitted as fragments too.
pub fn build_chunks(
	elements: &[Element],
	document: &str,
	cfg: &ChunkingConfig,
) -> Result<Vec<TextChunk>> {
	let mut chunks = Vec::new();
	let mut current_title: Option<String> = None;

	for element in elements {
		let text = element.text.trim();

		if text.is_empty() || !sift_chunking::is_meaningful(text, cfg.min_meaningful_chars) {
			continue;
		}
		if TITLE_KINDS.contains(&element.kind.as_str()) {
			current_title = Some(text.to_string());
		}

		let page_number = element.page_number.unwrap_or(1);

		for piece in sift_chunking::split_text(text, cfg) {
			let chunk_id = sift_domain::chunk_id(document, page_number, chunks.len());
			let chunk = TextChunk::new(
				&piece,
				page_number,
				current_title.as_deref(),
				chunk_id,
				document,
			)
			.map_err(|err| Error::Processing { message: err.to_string() })?;

			chunks.push(chunk);
		}
	}

	Ok(chunks)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn cfg() -> ChunkingConfig {
		ChunkingConfig { max_chars: 2_000, min_meaningful_chars: 10 }
	}

	#[test]
	fn parses_elements_with_page_fallback() {
		let json = serde_json::json!([
			{ "type": "Title", "text": "Risk Factors", "metadata": { "page_number": 2 } },
			{ "type": "NarrativeText", "text": "Body", "metadata": { "page_number": 0 } },
			{ "type": "NarrativeText", "text": "More" }
		]);
		let elements = parse_elements(json).expect("parse failed");

		assert_eq!(elements.len(), 3);
		assert_eq!(elements[0].page_number, Some(2));
		assert_eq!(elements[1].page_number, None);
		assert_eq!(elements[2].page_number, None);
	}

	#[test]
	fn requests_raw_elements_unless_chunking_is_configured() {
		let mut provider = sift_config::ExtractionProviderConfig::default();
		let names = |fields: Vec<(&'static str, String)>| {
			fields.into_iter().map(|(name, _)| name).collect::<Vec<_>>()
		};

		assert_eq!(names(form_fields(&provider)), vec!["strategy"]);

		provider.chunking_strategy = Some("by_title".to_string());

		let fields = form_fields(&provider);

		assert_eq!(fields[1], ("chunking_strategy", "by_title".to_string()));
		assert_eq!(
			names(fields),
			vec!["strategy", "chunking_strategy", "max_characters", "combine_under_n_chars"]
		);
	}

	#[test]
	fn rejects_non_array_response() {
		let err = parse_elements(serde_json::json!({ "detail": "bad" })).unwrap_err();

		assert!(matches!(err, Error::InvalidResponse { .. }));
	}

	#[test]
	fn associates_titles_and_drops_noise() {
		let elements = vec![
			Element {
				kind: "NarrativeText".to_string(),
				text: "Preface text before any heading.".to_string(),
				page_number: Some(1),
			},
			Element {
				kind: "Title".to_string(),
				text: "Market Risk Overview".to_string(),
				page_number: Some(3),
			},
			Element { kind: "NarrativeText".to_string(), text: "12 34 56 78 90".to_string(), page_number: Some(3) },
			Element {
				kind: "NarrativeText".to_string(),
				text: "Interest rates may rise sharply.".to_string(),
				page_number: None,
			},
		];
		let chunks = build_chunks(&elements, "a.pdf", &cfg()).expect("build failed");

		assert_eq!(chunks.len(), 3);
		assert_eq!(chunks[0].section_title(), None);
		assert_eq!(chunks[1].section_title(), Some("Market Risk Overview"));
		assert_eq!(chunks[2].section_title(), Some("Market Risk Overview"));
		assert_eq!(chunks[2].page_number(), 1);
		assert_eq!(chunks[2].document_source(), "a.pdf");

		let ids: std::collections::HashSet<_> = chunks.iter().map(TextChunk::chunk_id).collect();

		assert_eq!(ids.len(), 3);
	}

	#[test]
	fn splits_long_elements() {
		let cfg = ChunkingConfig { max_chars: 40, min_meaningful_chars: 10 };
		let elements = vec![Element {
			kind: "NarrativeText".to_string(),
			text: "The first sentence is here. The second sentence follows it.".to_string(),
			page_number: Some(4),
		}];
		let chunks = build_chunks(&elements, "b.pdf", &cfg).expect("build failed");

		assert_eq!(chunks.len(), 2);
		assert_eq!(chunks[0].text(), "The first sentence is here.");
		assert!(chunks.iter().all(|chunk| chunk.page_number() == 4));
	}
}
