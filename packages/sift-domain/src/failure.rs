use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ErrorCode;

/// One failed document, or one system-level failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
	pub document: String,
	pub error_code: ErrorCode,
	pub reason: String,
	#[serde(with = "crate::time_serde")]
	pub timestamp: OffsetDateTime,
}
impl FailureRecord {
	/// Stamps the record with the current UTC time. A missing or blank `reason` falls back to
	/// the code's standard message.
	pub fn new(document: impl Into<String>, error_code: ErrorCode, reason: Option<String>) -> Self {
		let reason = reason
			.filter(|reason| !reason.trim().is_empty())
			.unwrap_or_else(|| error_code.standard_message().to_string());

		Self { document: document.into(), error_code, reason, timestamp: OffsetDateTime::now_utc() }
	}
}
