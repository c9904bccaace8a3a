mod error;

pub use error::{Error, Result};

use std::{
	collections::HashMap,
	fs,
	path::{Path, PathBuf},
	sync::{
		Arc, Mutex,
		atomic::{AtomicUsize, Ordering},
	},
	time::{Duration, SystemTime, UNIX_EPOCH},
};

use sift_domain::{ChallengeInfo, Document, JobToBeDone, Persona, Request, TextChunk};
use sift_service::{BoxFuture, EmbeddingProvider, ExtractionProvider};

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// A scratch documents directory removed on drop.
pub struct TestDocuments {
	root: PathBuf,
	cleaned: bool,
}
impl TestDocuments {
	pub fn new(label: &str) -> Result<Self> {
		let nanos = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map_err(|err| Error::Message(format!("System clock is before the epoch: {err}.")))?
			.as_nanos();
		let name = format!(
			"sift_test_{label}_{}_{}_{nanos}",
			std::process::id(),
			DIR_COUNTER.fetch_add(1, Ordering::SeqCst)
		);
		let root = std::env::temp_dir().join(name);

		fs::create_dir_all(&root)?;

		Ok(Self { root, cleaned: false })
	}

	pub fn path(&self) -> &Path {
		&self.root
	}

	/// Writes `contents` to `relative` under the root, creating parent folders.
	pub fn write(&self, relative: &str, contents: &str) -> Result<PathBuf> {
		let path = self.root.join(relative);

		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)?;
		}

		fs::write(&path, contents)?;

		Ok(path)
	}

	pub fn cleanup(mut self) -> Result<()> {
		self.cleanup_inner()
	}

	fn cleanup_inner(&mut self) -> Result<()> {
		if self.cleaned {
			return Ok(());
		}

		fs::remove_dir_all(&self.root)?;

		self.cleaned = true;

		Ok(())
	}
}

impl Drop for TestDocuments {
	fn drop(&mut self) {
		if self.cleaned {
			return;
		}
		if let Err(err) = self.cleanup_inner() {
			eprintln!("Failed to remove test documents at {:?}: {err}.", self.root);
		}
	}
}

/// Embeds text as normalized keyword counts plus a constant bias axis, so fragments sharing
/// more keywords with the query score higher.
pub struct KeywordEmbedding {
	pub keywords: Vec<String>,
}
impl KeywordEmbedding {
	pub fn new(keywords: &[&str]) -> Self {
		Self { keywords: keywords.iter().map(|keyword| keyword.to_lowercase()).collect() }
	}

	pub fn vector(&self, text: &str) -> Vec<f32> {
		let lower = text.to_lowercase();
		let mut vector: Vec<f32> =
			self.keywords.iter().map(|keyword| lower.matches(keyword.as_str()).count() as f32).collect();

		vector.push(1.0);

		let norm = vector.iter().map(|value| value * value).sum::<f32>().sqrt();

		vector.iter_mut().for_each(|value| *value /= norm);

		vector
	}
}
impl EmbeddingProvider for KeywordEmbedding {
	fn embed<'a>(
		&'a self,
		texts: &'a [String],
	) -> BoxFuture<'a, sift_providers::Result<Vec<Vec<f32>>>> {
		let vectors: Vec<Vec<f32>> = texts.iter().map(|text| self.vector(text)).collect();

		Box::pin(async move { Ok(vectors) })
	}
}

/// Returns the same unit vector for every input, so every fragment ties.
pub struct StubEmbedding {
	pub vector_dim: usize,
}
impl EmbeddingProvider for StubEmbedding {
	fn embed<'a>(
		&'a self,
		texts: &'a [String],
	) -> BoxFuture<'a, sift_providers::Result<Vec<Vec<f32>>>> {
		let mut unit = vec![0.0; self.vector_dim.max(1)];

		unit[0] = 1.0;

		let vectors: Vec<Vec<f32>> = texts.iter().map(|_| unit.clone()).collect();

		Box::pin(async move { Ok(vectors) })
	}
}

pub struct SpyEmbedding {
	pub inner: Arc<dyn EmbeddingProvider>,
	pub calls: Arc<AtomicUsize>,
	pub inputs: Arc<Mutex<Vec<Vec<String>>>>,
}
impl SpyEmbedding {
	pub fn new(inner: Arc<dyn EmbeddingProvider>) -> Self {
		Self { inner, calls: Arc::new(AtomicUsize::new(0)), inputs: Arc::new(Mutex::new(Vec::new())) }
	}
}
impl EmbeddingProvider for SpyEmbedding {
	fn embed<'a>(
		&'a self,
		texts: &'a [String],
	) -> BoxFuture<'a, sift_providers::Result<Vec<Vec<f32>>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.inputs.lock().unwrap_or_else(|err| err.into_inner()).push(texts.to_vec());

		self.inner.embed(texts)
	}
}

/// Misbehaving embedding services.
pub enum FaultyEmbedding {
	/// Drops the last vector.
	ShortBatch,
	/// Gives fragment vectors one more dimension than the query vector.
	DimensionMismatch,
	/// Fails with an invalid-response error.
	Failing,
}
impl EmbeddingProvider for FaultyEmbedding {
	fn embed<'a>(
		&'a self,
		texts: &'a [String],
	) -> BoxFuture<'a, sift_providers::Result<Vec<Vec<f32>>>> {
		let result: sift_providers::Result<Vec<Vec<f32>>> = match self {
			Self::ShortBatch => Ok(texts.iter().skip(1).map(|_| vec![1.0, 0.0]).collect()),
			Self::DimensionMismatch => Ok(texts
				.iter()
				.enumerate()
				.map(|(idx, _)| if idx == 0 { vec![1.0, 0.0] } else { vec![1.0, 0.0, 0.0] })
				.collect()),
			Self::Failing => Err(sift_providers::Error::InvalidResponse {
				message: "Embedding response is missing data array.".to_string(),
			}),
		};

		Box::pin(async move { result })
	}
}

/// How [`ScriptedExtraction`] treats one document.
#[derive(Clone, Debug)]
pub enum Script {
	/// Fragment texts, all on page 1 unless given as `(page, text)` via [`Script::Pages`].
	Texts(Vec<String>),
	Pages(Vec<(u32, String)>),
	NotFound,
	Unsupported,
	Encrypted,
	Fail(String),
	/// Texts attributed to another document's name.
	Mislabelled { source: String, texts: Vec<String> },
	/// Sleeps before returning the given texts.
	Slow(Duration, Vec<String>),
	/// Never completes.
	Hang,
	Panic,
}

/// Extraction driven by a per-filename script. Unknown filenames are reported missing.
pub struct ScriptedExtraction {
	pub scripts: HashMap<String, Script>,
	pub calls: Arc<AtomicUsize>,
	pub paths: Arc<Mutex<Vec<PathBuf>>>,
}
impl ScriptedExtraction {
	pub fn new<I, S>(scripts: I) -> Self
	where
		I: IntoIterator<Item = (S, Script)>,
		S: Into<String>,
	{
		Self {
			scripts: scripts.into_iter().map(|(name, script)| (name.into(), script)).collect(),
			calls: Arc::new(AtomicUsize::new(0)),
			paths: Arc::new(Mutex::new(Vec::new())),
		}
	}
}
impl ExtractionProvider for ScriptedExtraction {
	fn extract<'a>(
		&'a self,
		path: &'a Path,
		document: &'a str,
	) -> BoxFuture<'a, sift_providers::Result<Vec<TextChunk>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.paths.lock().unwrap_or_else(|err| err.into_inner()).push(path.to_path_buf());

		let script = self.scripts.get(document).cloned().unwrap_or(Script::NotFound);

		Box::pin(async move {
			match script {
				Script::Texts(texts) => Ok(chunks(document, texts.into_iter().map(|text| (1, text)))),
				Script::Pages(pages) => Ok(chunks(document, pages)),
				Script::NotFound => Err(sift_providers::Error::NotFound { path: path.to_path_buf() }),
				Script::Unsupported => Err(sift_providers::Error::UnsupportedFormat {
					message: format!("Invalid PDF format: {document}."),
				}),
				Script::Encrypted => Err(sift_providers::Error::Encrypted { path: path.to_path_buf() }),
				Script::Fail(message) => Err(sift_providers::Error::Processing { message }),
				Script::Mislabelled { source, texts } => {
					Ok(chunks(&source, texts.into_iter().map(|text| (1, text))))
				},
				Script::Slow(delay, texts) => {
					tokio::time::sleep(delay).await;

					Ok(chunks(document, texts.into_iter().map(|text| (1, text))))
				},
				Script::Hang => {
					std::future::pending::<()>().await;

					Ok(Vec::new())
				},
				Script::Panic => panic!("Scripted extraction panic for {document}."),
			}
		})
	}
}

/// Reads UTF-8 files and emits one fragment per non-blank line; a line starting with `#`
/// becomes the section title for the lines after it.
pub struct TextFileExtraction;
impl ExtractionProvider for TextFileExtraction {
	fn extract<'a>(
		&'a self,
		path: &'a Path,
		document: &'a str,
	) -> BoxFuture<'a, sift_providers::Result<Vec<TextChunk>>> {
		Box::pin(async move {
			let raw = tokio::fs::read_to_string(path)
				.await
				.map_err(|_| sift_providers::Error::NotFound { path: path.to_path_buf() })?;
			let mut title: Option<String> = None;
			let mut out = Vec::new();

			for line in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
				if let Some(heading) = line.strip_prefix('#') {
					title = Some(heading.trim().to_string());

					continue;
				}

				let id = sift_domain::chunk_id(document, 1, out.len());
				let chunk = TextChunk::new(line, 1, title.as_deref(), id, document)
					.map_err(|err| sift_providers::Error::Processing { message: err.to_string() })?;

				out.push(chunk);
			}

			Ok::<_, sift_providers::Error>(out)
		})
	}
}

pub fn request(filenames: &[&str], role: &str, task: &str) -> Request {
	Request {
		challenge_info: ChallengeInfo {
			challenge_id: "test_challenge".to_string(),
			test_case_name: "testkit".to_string(),
			description: None,
		},
		documents: filenames
			.iter()
			.map(|name| Document { filename: name.to_string(), title: name.to_string() })
			.collect(),
		persona: Persona { role: role.to_string() },
		job_to_be_done: JobToBeDone { task: task.to_string() },
	}
}

pub fn chunk(document: &str, index: usize, text: &str) -> TextChunk {
	match TextChunk::new(text, 1, None, sift_domain::chunk_id(document, 1, index), document) {
		Ok(chunk) => chunk,
		Err(err) => panic!("Test chunk must be valid: {err}."),
	}
}

fn chunks<I>(document: &str, pages: I) -> Vec<TextChunk>
where
	I: IntoIterator<Item = (u32, String)>,
{
	pages
		.into_iter()
		.enumerate()
		.filter_map(|(index, (page, text))| {
			TextChunk::new(&text, page, None, sift_domain::chunk_id(document, page, index), document)
				.ok()
		})
		.collect()
}
