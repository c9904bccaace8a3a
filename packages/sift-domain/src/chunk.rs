use serde::Serialize;

const CHUNK_ID_HEX_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
	#[error("Text must be non-empty after trimming.")]
	EmptyText,
	#[error("Page number {page} is invalid; pages start at 1.")]
	InvalidPage { page: u32 },
	#[error("Relevance score {score} is outside the range 0.0-1.0.")]
	ScoreOutOfRange { score: f32 },
	#[error("{field} must be non-empty.")]
	MissingField { field: &'static str },
	#[error("Text preview has {chars} characters; the limit is {limit}.")]
	PreviewTooLong { chars: usize, limit: usize },
}

/// A unit of extracted text with page and section provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextChunk {
	text: String,
	page_number: u32,
	section_title: Option<String>,
	chunk_id: String,
	document_source: String,
}
impl TextChunk {
	/// Builds a chunk, trimming `text` and `section_title`. A blank title is stored as `None`.
	pub fn new(
		text: &str,
		page_number: u32,
		section_title: Option<&str>,
		chunk_id: impl Into<String>,
		document_source: impl Into<String>,
	) -> Result<Self, RecordError> {
		let text = text.trim();

		if text.is_empty() {
			return Err(RecordError::EmptyText);
		}
		if page_number == 0 {
			return Err(RecordError::InvalidPage { page: page_number });
		}

		let chunk_id = chunk_id.into();

		if chunk_id.trim().is_empty() {
			return Err(RecordError::MissingField { field: "chunk_id" });
		}

		let document_source = document_source.into();

		if document_source.trim().is_empty() {
			return Err(RecordError::MissingField { field: "document_source" });
		}

		let section_title =
			section_title.map(str::trim).filter(|title| !title.is_empty()).map(str::to_string);

		Ok(Self { text: text.to_string(), page_number, section_title, chunk_id, document_source })
	}

	pub fn text(&self) -> &str {
		&self.text
	}

	pub fn page_number(&self) -> u32 {
		self.page_number
	}

	pub fn section_title(&self) -> Option<&str> {
		self.section_title.as_deref()
	}

	pub fn chunk_id(&self) -> &str {
		&self.chunk_id
	}

	pub fn document_source(&self) -> &str {
		&self.document_source
	}
}

/// A chunk paired with its relevance to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedChunk {
	chunk: TextChunk,
	relevance_score: f32,
}
impl RankedChunk {
	pub fn new(chunk: TextChunk, relevance_score: f32) -> Result<Self, RecordError> {
		if !(0.0..=1.0).contains(&relevance_score) {
			return Err(RecordError::ScoreOutOfRange { score: relevance_score });
		}

		Ok(Self { chunk, relevance_score })
	}

	pub fn chunk(&self) -> &TextChunk {
		&self.chunk
	}

	pub fn relevance_score(&self) -> f32 {
		self.relevance_score
	}
}

/// Deterministic chunk identifier: the first 12 hex digits of a BLAKE3 hash over the source
/// document, page and the chunk's index within that document.
pub fn chunk_id(document: &str, page_number: u32, index: usize) -> String {
	let mut hasher = blake3::Hasher::new();

	hasher.update(document.as_bytes());
	hasher.update(&[0]);
	hasher.update(&page_number.to_le_bytes());
	hasher.update(&(index as u64).to_le_bytes());

	let hex = hasher.finalize().to_hex();

	hex.as_str()[..CHUNK_ID_HEX_LEN].to_string()
}
