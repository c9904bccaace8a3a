use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
	pub service: Service,
	pub pipeline: Pipeline,
	pub documents: Documents,
	pub chunking: Chunking,
	pub providers: Providers,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Service {
	/// An `EnvFilter` directive, e.g. "info" or "sift_service=debug,info".
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { log_level: "info".to_string() }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Pipeline {
	/// Ceiling for a single document's extraction, counted from the moment it gets a
	/// concurrency slot.
	pub document_timeout_secs: u64,
	pub max_concurrent_documents: usize,
}
impl Default for Pipeline {
	fn default() -> Self {
		Self { document_timeout_secs: 15, max_concurrent_documents: 4 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Documents {
	/// Subfolders of the base path searched, in order, after the base path itself.
	pub search_dirs: Vec<String>,
}
impl Default for Documents {
	fn default() -> Self {
		Self { search_dirs: vec!["PDFs".to_string(), "pdfs".to_string()] }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Chunking {
	pub max_chars: usize,
	pub min_meaningful_chars: usize,
}
impl Default for Chunking {
	fn default() -> Self {
		Self { max_chars: 2_000, min_meaningful_chars: 10 }
	}
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub extraction: ExtractionProviderConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	/// Requested output dimensions; omitted from the request when unset.
	pub dimensions: Option<u32>,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}
impl Default for EmbeddingProviderConfig {
	fn default() -> Self {
		Self {
			provider_id: "local".to_string(),
			api_base: "http://127.0.0.1:8080".to_string(),
			api_key: String::new(),
			path: "/v1/embeddings".to_string(),
			model: "all-MiniLM-L6-v2".to_string(),
			dimensions: None,
			timeout_ms: 60_000,
			default_headers: Map::new(),
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ExtractionProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	/// Partition strategy forwarded to the service, e.g. "fast" or "hi_res".
	pub strategy: String,
	/// Server-side chunking, e.g. "by_title". Unset keeps raw `Title` and `Header` elements so
	/// fragments inherit their section titles.
	pub chunking_strategy: Option<String>,
	/// Only sent with `chunking_strategy`.
	pub max_characters: u32,
	/// Only sent with `chunking_strategy`.
	pub combine_under_n_chars: u32,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}
impl Default for ExtractionProviderConfig {
	fn default() -> Self {
		Self {
			provider_id: "unstructured".to_string(),
			api_base: "http://127.0.0.1:8000".to_string(),
			api_key: String::new(),
			path: "/general/v0/general".to_string(),
			strategy: "fast".to_string(),
			chunking_strategy: None,
			max_characters: 2_000,
			combine_under_n_chars: 100,
			timeout_ms: 30_000,
			default_headers: Map::new(),
		}
	}
}
