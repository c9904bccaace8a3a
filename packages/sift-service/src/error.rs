use sift_domain::{ErrorCode, RecordError, ValidationFailure};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid input: {message}")]
	InvalidInput { message: String },
	#[error("{message}")]
	NotFound { message: String },
	#[error("{message}")]
	UnsupportedFormat { message: String },
	#[error("{message}")]
	Encrypted { message: String },
	#[error("Service unavailable: {message}")]
	ServiceUnavailable { message: String },
	#[error("Processing failed: {message}")]
	ProcessingFailed { message: String },
}
impl Error {
	pub fn code(&self) -> ErrorCode {
		match self {
			Self::InvalidInput { .. } => ErrorCode::InvalidInput,
			Self::NotFound { .. } => ErrorCode::FileNotFound,
			Self::UnsupportedFormat { .. } => ErrorCode::UnsupportedFormat,
			Self::Encrypted { .. } => ErrorCode::FileEncrypted,
			Self::ServiceUnavailable { .. } => ErrorCode::ServiceUnavailable,
			Self::ProcessingFailed { .. } => ErrorCode::ProcessingFailed,
		}
	}
}

impl From<ValidationFailure> for Error {
	fn from(err: ValidationFailure) -> Self {
		Self::InvalidInput { message: err.message }
	}
}

impl From<RecordError> for Error {
	fn from(err: RecordError) -> Self {
		Self::ProcessingFailed { message: err.to_string() }
	}
}

impl From<sift_providers::Error> for Error {
	fn from(err: sift_providers::Error) -> Self {
		use sift_providers::Error as ProviderError;

		let message = err.to_string();

		match err {
			ProviderError::NotFound { .. } => Self::NotFound { message },
			ProviderError::UnsupportedFormat { .. } => Self::UnsupportedFormat { message },
			ProviderError::Encrypted { .. } => Self::Encrypted { message },
			ProviderError::InvalidConfig { .. }
			| ProviderError::InvalidHeaderName(_)
			| ProviderError::InvalidHeaderValue(_) => Self::ServiceUnavailable { message },
			other if other.is_unreachable() => Self::ServiceUnavailable { message },
			_ => Self::ProcessingFailed { message },
		}
	}
}

#[cfg(test)]
mod tests {
	use std::path::PathBuf;

	use super::*;

	#[test]
	fn provider_errors_keep_document_classification() {
		let err = Error::from(sift_providers::Error::Encrypted { path: PathBuf::from("x.pdf") });

		assert_eq!(err.code(), ErrorCode::FileEncrypted);

		let err = Error::from(sift_providers::Error::InvalidResponse {
			message: "Embedding response is missing data array.".to_string(),
		});

		assert_eq!(err.code(), ErrorCode::ProcessingFailed);
	}

	#[test]
	fn validation_failures_are_invalid_input() {
		let err = Error::from(ValidationFailure { message: "No documents.".to_string() });

		assert_eq!(err.code(), ErrorCode::InvalidInput);
	}
}
