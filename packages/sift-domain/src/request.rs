use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeInfo {
	pub challenge_id: String,
	pub test_case_name: String,
	#[serde(default)]
	pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Document {
	pub filename: String,
	pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Persona {
	pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobToBeDone {
	pub task: String,
}

/// A parsed analysis request. Parsing checks shape only; policy lives in [`crate::validate`].
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
	pub challenge_info: ChallengeInfo,
	pub documents: Vec<Document>,
	pub persona: Persona,
	pub job_to_be_done: JobToBeDone,
}
impl Request {
	pub fn from_json(raw: &str) -> serde_json::Result<Self> {
		serde_json::from_str(raw)
	}

	pub fn filenames(&self) -> Vec<String> {
		self.documents.iter().map(|document| document.filename.clone()).collect()
	}
}
