pub mod assemble;
pub mod coordinator;
pub mod error;
pub mod pipeline;
pub mod ranking;
pub mod timing;

pub use assemble::{assemble, fallback};
pub use coordinator::{Coordinator, ProcessedDocuments, ProcessingOutcome};
pub use error::{Error, Result};
pub use ranking::Ranker;

use std::{future::Future, path::Path, pin::Pin, sync::Arc};

use sift_config::Config;
use sift_domain::TextChunk;
use sift_providers::{HttpEmbedding, HttpExtraction};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Maps texts to unit-normalized vectors, one per input, in input order.
pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		texts: &'a [String],
	) -> BoxFuture<'a, sift_providers::Result<Vec<Vec<f32>>>>;
}

/// Turns one document into fragments. Failures must classify as not-found,
/// unsupported-format, encrypted, or anything else (processing-failed).
pub trait ExtractionProvider
where
	Self: Send + Sync,
{
	fn extract<'a>(
		&'a self,
		path: &'a Path,
		document: &'a str,
	) -> BoxFuture<'a, sift_providers::Result<Vec<TextChunk>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub extraction: Arc<dyn ExtractionProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		extraction: Arc<dyn ExtractionProvider>,
	) -> Self {
		Self { embedding, extraction }
	}

	/// The HTTP adapters described by `cfg.providers`.
	pub fn from_config(cfg: &Config) -> Result<Self> {
		let embedding = HttpEmbedding::new(&cfg.providers.embedding)?;
		let extraction = HttpExtraction::new(&cfg.providers.extraction, &cfg.chunking)?;

		Ok(Self { embedding: Arc::new(embedding), extraction: Arc::new(extraction) })
	}
}

pub struct SiftService {
	pub cfg: Config,
	pub providers: Providers,
	coordinator: Coordinator,
	ranker: Ranker,
}
impl SiftService {
	pub fn new(cfg: Config) -> Result<Self> {
		let providers = Providers::from_config(&cfg)?;

		Ok(Self::with_providers(cfg, providers))
	}

	pub fn with_providers(cfg: Config, providers: Providers) -> Self {
		let coordinator =
			Coordinator::new(providers.extraction.clone(), &cfg.pipeline, &cfg.documents);
		let ranker = Ranker::new(providers.embedding.clone());

		Self { cfg, providers, coordinator, ranker }
	}
}

impl EmbeddingProvider for HttpEmbedding {
	fn embed<'a>(
		&'a self,
		texts: &'a [String],
	) -> BoxFuture<'a, sift_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(HttpEmbedding::embed(self, texts))
	}
}

impl ExtractionProvider for HttpExtraction {
	fn extract<'a>(
		&'a self,
		path: &'a Path,
		document: &'a str,
	) -> BoxFuture<'a, sift_providers::Result<Vec<TextChunk>>> {
		Box::pin(HttpExtraction::extract(self, path, document))
	}
}
