use serde::Serialize;
use time::OffsetDateTime;

use crate::{ELLIPSIS, FailureRecord, RecordError};

/// Output projection of a ranked chunk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedSection {
	document: String,
	section_title: String,
	text_preview: String,
	relevance_score: f32,
	page_number: u32,
}
impl ExtractedSection {
	pub fn new(
		document: impl Into<String>,
		section_title: impl Into<String>,
		text_preview: impl Into<String>,
		relevance_score: f32,
		page_number: u32,
		preview_limit: usize,
	) -> Result<Self, RecordError> {
		let document = document.into();
		let section_title = section_title.into();
		let text_preview = text_preview.into();

		if document.trim().is_empty() {
			return Err(RecordError::MissingField { field: "document" });
		}
		if section_title.trim().is_empty() {
			return Err(RecordError::MissingField { field: "section_title" });
		}
		if text_preview.is_empty() {
			return Err(RecordError::MissingField { field: "text_preview" });
		}

		let chars = text_preview.chars().count();

		if chars > preview_limit {
			return Err(RecordError::PreviewTooLong { chars, limit: preview_limit });
		}
		if !(0.0..=1.0).contains(&relevance_score) {
			return Err(RecordError::ScoreOutOfRange { score: relevance_score });
		}
		if page_number == 0 {
			return Err(RecordError::InvalidPage { page: page_number });
		}

		Ok(Self { document, section_title, text_preview, relevance_score, page_number })
	}

	pub fn document(&self) -> &str {
		&self.document
	}

	pub fn section_title(&self) -> &str {
		&self.section_title
	}

	pub fn text_preview(&self) -> &str {
		&self.text_preview
	}

	pub fn relevance_score(&self) -> f32 {
		self.relevance_score
	}

	pub fn page_number(&self) -> u32 {
		self.page_number
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseMetadata {
	pub input_documents: Vec<String>,
	pub persona: String,
	pub job_to_be_done: String,
	#[serde(with = "crate::time_serde")]
	pub processing_timestamp: OffsetDateTime,
	pub total_documents_processed: usize,
	pub total_chunks_extracted: usize,
	pub errors: Vec<FailureRecord>,
	pub processing_time_seconds: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
	pub metadata: ResponseMetadata,
	pub extracted_sections: Vec<ExtractedSection>,
}

/// Cuts `text` to at most `max_chars` characters. When cut, the tail is replaced by an
/// ellipsis that counts toward the limit.
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
	if text.chars().count() <= max_chars {
		return text.to_string();
	}

	let keep = max_chars.saturating_sub(ELLIPSIS.chars().count());
	let mut preview: String = text.chars().take(keep).collect();

	preview.push_str(ELLIPSIS);

	preview
}
