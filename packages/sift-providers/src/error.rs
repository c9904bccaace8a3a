use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	SerdeJson(#[from] serde_json::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("Failed to read document at {path:?}.")]
	ReadDocument { path: PathBuf, source: std::io::Error },
	#[error("Document file not accessible: {path:?}.")]
	NotFound { path: PathBuf },
	#[error("{message}")]
	UnsupportedFormat { message: String },
	#[error("Password-protected PDF: {path:?}.")]
	Encrypted { path: PathBuf },
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("{message}")]
	InvalidResponse { message: String },
	#[error("{message}")]
	Processing { message: String },
}
impl Error {
	/// True when the remote service could not be reached at all.
	pub fn is_unreachable(&self) -> bool {
		matches!(self, Self::Reqwest(err) if err.is_connect())
	}
}
