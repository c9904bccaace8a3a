use std::{collections::HashSet, time::Duration};

use time::OffsetDateTime;

use sift_domain::{
	ExtractedSection, FailureRecord, MAX_SECTIONS, PREVIEW_CHARS, RankedChunk, Request, Response,
	ResponseMetadata, SYSTEM_DOCUMENT, UNTITLED_SECTION, truncate_preview,
};

use crate::{Error, Result};

/// Builds the response from ranked fragments. Any broken output invariant is a
/// processing failure.
pub fn assemble(
	ranked: &[RankedChunk],
	request: &Request,
	failures: Vec<FailureRecord>,
	elapsed: Duration,
) -> Result<Response> {
	let mut sections = Vec::with_capacity(ranked.len().min(MAX_SECTIONS));

	for item in ranked.iter().take(MAX_SECTIONS) {
		let chunk = item.chunk();
		let section = ExtractedSection::new(
			chunk.document_source(),
			chunk.section_title().unwrap_or(UNTITLED_SECTION),
			truncate_preview(chunk.text(), PREVIEW_CHARS),
			item.relevance_score(),
			chunk.page_number(),
			PREVIEW_CHARS,
		)?;

		sections.push(section);
	}

	let processed: HashSet<&str> =
		ranked.iter().map(|item| item.chunk().document_source()).collect();
	let metadata = ResponseMetadata {
		input_documents: request.filenames(),
		persona: request.persona.role.trim().to_string(),
		job_to_be_done: request.job_to_be_done.task.trim().to_string(),
		processing_timestamp: OffsetDateTime::now_utc(),
		total_documents_processed: processed.len(),
		total_chunks_extracted: sections.len(),
		errors: failures,
		processing_time_seconds: seconds(elapsed),
	};
	let response = Response { metadata, extracted_sections: sections };

	check(&response)?;

	Ok(response)
}

/// The response emitted when ranking or assembly fails: no sections and one system-level
/// failure describing the cause.
pub fn fallback(request: &Request, err: &Error, elapsed: Duration) -> Response {
	let failure = FailureRecord::new(SYSTEM_DOCUMENT, err.code(), Some(err.to_string()));

	Response {
		metadata: ResponseMetadata {
			input_documents: request.filenames(),
			persona: request.persona.role.trim().to_string(),
			job_to_be_done: request.job_to_be_done.task.trim().to_string(),
			processing_timestamp: OffsetDateTime::now_utc(),
			total_documents_processed: 0,
			total_chunks_extracted: 0,
			errors: vec![failure],
			processing_time_seconds: seconds(elapsed),
		},
		extracted_sections: Vec::new(),
	}
}

fn check(response: &Response) -> Result<()> {
	let metadata = &response.metadata;
	let requested = metadata.input_documents.len();
	let known: HashSet<&str> = metadata.input_documents.iter().map(String::as_str).collect();

	if response.extracted_sections.len() > MAX_SECTIONS {
		return Err(violation(format!(
			"{} sections exceed the cap of {MAX_SECTIONS}.",
			response.extracted_sections.len()
		)));
	}
	if metadata.total_chunks_extracted != response.extracted_sections.len() {
		return Err(violation("Chunk count does not match emitted sections.".to_string()));
	}
	if metadata.errors.len() + metadata.total_documents_processed > requested {
		return Err(violation(format!(
			"{} failures and {} processed documents exceed {requested} requested documents.",
			metadata.errors.len(),
			metadata.total_documents_processed
		)));
	}
	if metadata.persona.trim().is_empty() || metadata.job_to_be_done.trim().is_empty() {
		return Err(violation("Persona and task must be present in metadata.".to_string()));
	}
	if !metadata.processing_time_seconds.is_finite() || metadata.processing_time_seconds < 0.0 {
		return Err(violation("Processing time must be a non-negative number.".to_string()));
	}

	for section in &response.extracted_sections {
		if !known.contains(section.document()) {
			return Err(violation(format!(
				"Section references unrequested document {:?}.",
				section.document()
			)));
		}
	}

	Ok(())
}

fn violation(message: String) -> Error {
	tracing::error!(%message, "Response invariant violated.");

	Error::ProcessingFailed { message }
}

fn seconds(elapsed: Duration) -> f64 {
	(elapsed.as_secs_f64() * 1_000.0).round() / 1_000.0
}

#[cfg(test)]
mod tests {
	use sift_domain::{ChallengeInfo, Document, ErrorCode, JobToBeDone, Persona, TextChunk};

	use super::*;

	fn request(filenames: &[&str]) -> Request {
		Request {
			challenge_info: ChallengeInfo {
				challenge_id: "c1".to_string(),
				test_case_name: "unit".to_string(),
				description: None,
			},
			documents: filenames
				.iter()
				.map(|name| Document { filename: name.to_string(), title: String::new() })
				.collect(),
			persona: Persona { role: "Analyst".to_string() },
			job_to_be_done: JobToBeDone { task: "Summarize risk factors".to_string() },
		}
	}

	fn ranked(document: &str, index: usize, text: &str, title: Option<&str>, score: f32) -> RankedChunk {
		let chunk = TextChunk::new(text, 1, title, format!("{document}-{index}"), document)
			.expect("Chunk must be valid.");

		RankedChunk::new(chunk, score).expect("Score must be valid.")
	}

	#[test]
	fn caps_sections_and_counts_documents() {
		let items: Vec<_> =
			(0..60).map(|idx| ranked("a.pdf", idx, "Some fragment text.", None, 0.5)).collect();
		let response =
			assemble(&items, &request(&["a.pdf"]), Vec::new(), Duration::from_millis(1_234))
				.expect("Assembly must succeed.");

		assert_eq!(response.extracted_sections.len(), MAX_SECTIONS);
		assert_eq!(response.metadata.total_chunks_extracted, MAX_SECTIONS);
		assert_eq!(response.metadata.total_documents_processed, 1);
		assert_eq!(response.metadata.processing_time_seconds, 1.234);
		assert_eq!(response.extracted_sections[0].section_title(), UNTITLED_SECTION);
	}

	#[test]
	fn truncates_previews() {
		let long = "w".repeat(200);
		let items = vec![ranked("a.pdf", 0, &long, Some("Intro"), 0.9)];
		let response = assemble(&items, &request(&["a.pdf"]), Vec::new(), Duration::ZERO)
			.expect("Assembly must succeed.");
		let preview = response.extracted_sections[0].text_preview();

		assert_eq!(preview.chars().count(), PREVIEW_CHARS);
		assert!(preview.ends_with("..."));
	}

	#[test]
	fn rejects_more_records_than_documents() {
		let items = vec![ranked("a.pdf", 0, "Some fragment text.", None, 0.4)];
		let failures = vec![FailureRecord::new("a.pdf", ErrorCode::FileNotFound, None)];
		let err = assemble(&items, &request(&["a.pdf"]), failures, Duration::ZERO).unwrap_err();

		assert_eq!(err.code(), ErrorCode::ProcessingFailed);
	}

	#[test]
	fn rejects_sections_from_unknown_documents() {
		let items = vec![ranked("ghost.pdf", 0, "Some fragment text.", None, 0.4)];
		let err =
			assemble(&items, &request(&["a.pdf", "b.pdf"]), Vec::new(), Duration::ZERO).unwrap_err();

		assert_eq!(err.code(), ErrorCode::ProcessingFailed);
	}

	#[test]
	fn metadata_trims_persona_and_task() {
		let mut request = request(&["a.pdf"]);

		request.persona.role = "  Analyst ".to_string();
		request.job_to_be_done.task = "\tSummarize risk factors\n".to_string();

		let items = vec![ranked("a.pdf", 0, "Some fragment text.", None, 0.4)];
		let response =
			assemble(&items, &request, Vec::new(), Duration::ZERO).expect("Assembly must succeed.");
		let err = Error::ProcessingFailed { message: "boom".to_string() };
		let degraded = fallback(&request, &err, Duration::ZERO);

		for metadata in [&response.metadata, &degraded.metadata] {
			assert_eq!(metadata.persona, "Analyst");
			assert_eq!(metadata.job_to_be_done, "Summarize risk factors");
		}
	}

	#[test]
	fn fallback_carries_one_system_record() {
		let err = Error::ServiceUnavailable { message: "embedding engine down".to_string() };
		let response = fallback(&request(&["a.pdf"]), &err, Duration::from_secs(2));

		assert!(response.extracted_sections.is_empty());
		assert_eq!(response.metadata.total_documents_processed, 0);
		assert_eq!(response.metadata.errors.len(), 1);
		assert_eq!(response.metadata.errors[0].document, SYSTEM_DOCUMENT);
		assert_eq!(response.metadata.errors[0].error_code, ErrorCode::ServiceUnavailable);
	}
}
