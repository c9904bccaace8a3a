use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of failure classifications carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
	#[serde(rename = "E400_INVALID_INPUT")]
	InvalidInput,
	#[serde(rename = "E404_FILE_NOT_FOUND")]
	FileNotFound,
	#[serde(rename = "E415_UNSUPPORTED_FORMAT")]
	UnsupportedFormat,
	#[serde(rename = "E423_FILE_ENCRYPTED")]
	FileEncrypted,
	#[serde(rename = "E500_PROCESSING_FAILED")]
	ProcessingFailed,
	#[serde(rename = "E503_SERVICE_UNAVAILABLE")]
	ServiceUnavailable,
}
impl ErrorCode {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::InvalidInput => "E400_INVALID_INPUT",
			Self::FileNotFound => "E404_FILE_NOT_FOUND",
			Self::UnsupportedFormat => "E415_UNSUPPORTED_FORMAT",
			Self::FileEncrypted => "E423_FILE_ENCRYPTED",
			Self::ProcessingFailed => "E500_PROCESSING_FAILED",
			Self::ServiceUnavailable => "E503_SERVICE_UNAVAILABLE",
		}
	}

	pub fn standard_message(self) -> &'static str {
		match self {
			Self::InvalidInput => "Invalid input format",
			Self::FileNotFound => "Document file not accessible",
			Self::UnsupportedFormat => "Invalid PDF format",
			Self::FileEncrypted => "Password-protected PDF",
			Self::ProcessingFailed => "Unexpected processing error",
			Self::ServiceUnavailable => "External service unavailable",
		}
	}
}
impl fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn wire_names_match_display() {
		for code in [
			ErrorCode::InvalidInput,
			ErrorCode::FileNotFound,
			ErrorCode::UnsupportedFormat,
			ErrorCode::FileEncrypted,
			ErrorCode::ProcessingFailed,
			ErrorCode::ServiceUnavailable,
		] {
			let json = serde_json::to_value(code).expect("Failed to serialize code.");

			assert_eq!(json, serde_json::Value::String(code.to_string()));
		}
	}
}
