use std::collections::HashSet;

use crate::{ErrorCode, MAX_DOCUMENTS, Request};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationFailure {
	pub message: String,
}
impl ValidationFailure {
	fn new(message: impl Into<String>) -> Self {
		Self { message: message.into() }
	}

	pub fn code(&self) -> ErrorCode {
		ErrorCode::InvalidInput
	}
}

/// Accepts or rejects the request as a whole. The first violated rule wins.
pub fn validate(request: &Request) -> Result<(), ValidationFailure> {
	if request.documents.is_empty() {
		return Err(ValidationFailure::new("No documents provided in request."));
	}
	if request.documents.len() > MAX_DOCUMENTS {
		return Err(ValidationFailure::new(format!(
			"Too many documents ({}); at most {MAX_DOCUMENTS} are allowed.",
			request.documents.len()
		)));
	}

	let mut seen = HashSet::with_capacity(request.documents.len());

	for document in &request.documents {
		if !seen.insert(document.filename.as_str()) {
			return Err(ValidationFailure::new(format!(
				"Duplicate document filename {:?}.",
				document.filename
			)));
		}
	}

	if request.documents.iter().any(|document| document.filename.trim().is_empty()) {
		return Err(ValidationFailure::new("Document filenames must be non-empty."));
	}
	if request.persona.role.trim().is_empty() {
		return Err(ValidationFailure::new("Persona role must be non-empty."));
	}
	if request.job_to_be_done.task.trim().is_empty() {
		return Err(ValidationFailure::new("Job-to-be-done task must be non-empty."));
	}

	Ok(())
}
