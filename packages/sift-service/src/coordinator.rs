use std::{
	path::{Component, Path, PathBuf},
	sync::Arc,
	time::{Duration, Instant},
};

use tokio::{sync::Semaphore, task::JoinHandle};

use sift_domain::{Document, ErrorCode, FailureRecord, TextChunk};

use crate::{Error, ExtractionProvider};

/// The settled result of one document's unit of work.
#[derive(Debug)]
pub enum ProcessingOutcome {
	Extracted { document: String, path: PathBuf, chunks: Vec<TextChunk> },
	Failed { document: String, path: PathBuf, failure: FailureRecord },
}
impl ProcessingOutcome {
	fn failed(document: String, path: PathBuf, code: ErrorCode, reason: String) -> Self {
		let failure = FailureRecord::new(document.clone(), code, Some(reason));

		Self::Failed { document, path, failure }
	}

	pub fn document(&self) -> &str {
		match self {
			Self::Extracted { document, .. } | Self::Failed { document, .. } => document,
		}
	}

	pub fn path(&self) -> &Path {
		match self {
			Self::Extracted { path, .. } | Self::Failed { path, .. } => path,
		}
	}
}

/// Fragments and failures of a whole request, both in request order.
#[derive(Debug, Default)]
pub struct ProcessedDocuments {
	pub fragments: Vec<TextChunk>,
	pub failures: Vec<FailureRecord>,
	pub succeeded: usize,
}
impl ProcessedDocuments {
	pub fn from_outcomes(outcomes: Vec<ProcessingOutcome>) -> Self {
		let mut processed = Self::default();

		for outcome in outcomes {
			if let ProcessingOutcome::Failed { failure, .. } = &outcome {
				tracing::debug!(
					document = outcome.document(),
					path = %outcome.path().display(),
					error_code = failure.error_code.as_str(),
					"Document recorded as failed."
				);
			}

			match outcome {
				ProcessingOutcome::Extracted { chunks, .. } => {
					processed.succeeded += 1;

					processed.fragments.extend(chunks);
				},
				ProcessingOutcome::Failed { failure, .. } => processed.failures.push(failure),
			}
		}

		processed
	}
}

/// Fans documents out to the extraction provider with bounded concurrency and a
/// per-document timeout.
pub struct Coordinator {
	extraction: Arc<dyn ExtractionProvider>,
	timeout: Duration,
	max_concurrent: usize,
	search_dirs: Vec<String>,
}
impl Coordinator {
	pub fn new(
		extraction: Arc<dyn ExtractionProvider>,
		pipeline: &sift_config::Pipeline,
		documents: &sift_config::Documents,
	) -> Self {
		Self {
			extraction,
			timeout: Duration::from_secs(pipeline.document_timeout_secs),
			max_concurrent: pipeline.max_concurrent_documents.max(1),
			search_dirs: documents.search_dirs.clone(),
		}
	}

	/// `base/filename` if it exists, else the first existing `base/<dir>/filename` over the
	/// configured search dirs, else `base/filename` so extraction reports it missing. `None`
	/// when the filename would leave `base`.
	pub async fn resolve_path(&self, base_path: &Path, filename: &str) -> Option<PathBuf> {
		if !is_contained(filename) {
			return None;
		}

		let direct = base_path.join(filename);

		if exists(&direct).await {
			return Some(direct);
		}

		for dir in &self.search_dirs {
			let candidate = base_path.join(dir).join(filename);

			if exists(&candidate).await {
				return Some(candidate);
			}
		}

		Some(direct)
	}

	/// Runs every document to a terminal state. Never fails: each document's fault becomes a
	/// failure record.
	pub async fn process_all(&self, documents: &[Document], base_path: &Path) -> ProcessedDocuments {
		let outcomes = self.outcomes(documents, base_path).await;

		ProcessedDocuments::from_outcomes(outcomes)
	}

	async fn outcomes(&self, documents: &[Document], base_path: &Path) -> Vec<ProcessingOutcome> {
		let permits = Arc::new(Semaphore::new(self.max_concurrent));
		let mut slots = Vec::with_capacity(documents.len());

		for document in documents {
			let Some(path) = self.resolve_path(base_path, &document.filename).await else {
				tracing::warn!(
					document = %document.filename,
					"Document path leaves the documents directory; not reading it."
				);

				let outcome = ProcessingOutcome::failed(
					document.filename.clone(),
					PathBuf::from(&document.filename),
					ErrorCode::FileNotFound,
					format!("Document file not accessible: {}.", document.filename),
				);

				slots.push(Slot::Settled(outcome));

				continue;
			};
			let unit = Unit {
				extraction: self.extraction.clone(),
				permits: permits.clone(),
				timeout: self.timeout,
				document: document.filename.clone(),
				path: path.clone(),
			};

			slots.push(Slot::Running(document.filename.clone(), path, tokio::spawn(unit.run())));
		}

		let mut outcomes = Vec::with_capacity(slots.len());

		for slot in slots {
			let (document, path, handle) = match slot {
				Slot::Settled(outcome) => {
					outcomes.push(outcome);

					continue;
				},
				Slot::Running(document, path, handle) => (document, path, handle),
			};
			let outcome = match handle.await {
				Ok(outcome) => outcome,
				Err(err) => {
					tracing::error!(document = %document, error = %err, "Document unit aborted.");

					ProcessingOutcome::failed(
						document,
						path,
						ErrorCode::ProcessingFailed,
						format!("Document processing task failed: {err}."),
					)
				},
			};

			outcomes.push(outcome);
		}

		outcomes
	}
}

enum Slot {
	Settled(ProcessingOutcome),
	Running(String, PathBuf, JoinHandle<ProcessingOutcome>),
}

struct Unit {
	extraction: Arc<dyn ExtractionProvider>,
	permits: Arc<Semaphore>,
	timeout: Duration,
	document: String,
	path: PathBuf,
}
impl Unit {
	async fn run(self) -> ProcessingOutcome {
		let Self { extraction, permits, timeout, document, path } = self;
		let Ok(_permit) = permits.acquire_owned().await else {
			return ProcessingOutcome::failed(
				document,
				path,
				ErrorCode::ProcessingFailed,
				"Concurrency limiter closed before the document started.".to_string(),
			);
		};
		let started = Instant::now();
		// Extraction runs in its own task so a timeout can abandon it without aborting it.
		let task = {
			let path = path.clone();
			let document = document.clone();

			tokio::spawn(async move { extraction.extract(&path, &document).await })
		};

		match tokio::time::timeout(timeout, task).await {
			Ok(Ok(Ok(chunks))) if chunks.is_empty() => {
				tracing::warn!(document = %document, "Extraction yielded no fragments.");

				ProcessingOutcome::failed(
					document,
					path,
					ErrorCode::ProcessingFailed,
					"No meaningful text extracted from document.".to_string(),
				)
			},
			Ok(Ok(Ok(chunks))) => {
				tracing::info!(
					document = %document,
					chunks = chunks.len(),
					elapsed_ms = started.elapsed().as_millis() as u64,
					"Document extracted."
				);

				ProcessingOutcome::Extracted { document, path, chunks }
			},
			Ok(Ok(Err(err))) => {
				let err = Error::from(err);
				let code = extraction_code(err.code());

				tracing::warn!(
					document = %document,
					error_code = code.as_str(),
					error = %err,
					"Document extraction failed."
				);

				ProcessingOutcome::failed(document, path, code, err.to_string())
			},
			Ok(Err(err)) => {
				tracing::error!(document = %document, error = %err, "Extraction task panicked.");

				ProcessingOutcome::failed(
					document,
					path,
					ErrorCode::ProcessingFailed,
					"Unexpected processing error: extraction task panicked.".to_string(),
				)
			},
			Err(_) => {
				tracing::warn!(
					document = %document,
					timeout_secs = timeout.as_secs(),
					"Document extraction timed out; abandoning it."
				);

				ProcessingOutcome::failed(
					document,
					path,
					ErrorCode::ProcessingFailed,
					format!("Processing timed out after {} seconds.", timeout.as_secs()),
				)
			},
		}
	}
}

/// Extraction failures keep their document classification; everything else is
/// processing-failed.
fn extraction_code(code: ErrorCode) -> ErrorCode {
	match code {
		ErrorCode::FileNotFound | ErrorCode::UnsupportedFormat | ErrorCode::FileEncrypted => code,
		_ => ErrorCode::ProcessingFailed,
	}
}

/// Relative filenames made only of normal components stay under the base directory.
fn is_contained(filename: &str) -> bool {
	let path = Path::new(filename);

	path.components().next().is_some()
		&& path
			.components()
			.all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

async fn exists(path: &Path) -> bool {
	tokio::fs::try_exists(path).await.unwrap_or(false)
}
