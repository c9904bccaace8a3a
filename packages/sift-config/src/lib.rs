mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Chunking, Config, Documents, EmbeddingProviderConfig, ExtractionProviderConfig, Pipeline,
	Providers, Service,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } => Error::ParseConfig { path: path.to_path_buf(), source },
		other => other,
	})
}

pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: Default::default(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

/// Built-in defaults, used when no config file is given.
pub fn defaults() -> Config {
	let mut cfg = Config::default();

	normalize(&mut cfg);

	cfg
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.pipeline.document_timeout_secs == 0 {
		return Err(Error::Validation {
			message: "pipeline.document_timeout_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.pipeline.max_concurrent_documents == 0 {
		return Err(Error::Validation {
			message: "pipeline.max_concurrent_documents must be greater than zero.".to_string(),
		});
	}
	if cfg.chunking.max_chars == 0 {
		return Err(Error::Validation {
			message: "chunking.max_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.chunking.min_meaningful_chars > cfg.chunking.max_chars {
		return Err(Error::Validation {
			message: "chunking.min_meaningful_chars must not exceed chunking.max_chars."
				.to_string(),
		});
	}

	for dir in &cfg.documents.search_dirs {
		if Path::new(dir).is_absolute() || dir.split(['/', '\\']).any(|part| part == "..") {
			return Err(Error::Validation {
				message: format!(
					"documents.search_dirs entry {dir:?} must be a relative path inside the base path."
				),
			});
		}
	}

	for (label, api_base, path, timeout_ms) in [
		(
			"embedding",
			&cfg.providers.embedding.api_base,
			&cfg.providers.embedding.path,
			cfg.providers.embedding.timeout_ms,
		),
		(
			"extraction",
			&cfg.providers.extraction.api_base,
			&cfg.providers.extraction.path,
			cfg.providers.extraction.timeout_ms,
		),
	] {
		if api_base.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("providers.{label}.api_base must be non-empty."),
			});
		}
		if !path.starts_with('/') {
			return Err(Error::Validation {
				message: format!("providers.{label}.path must start with '/'."),
			});
		}
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("providers.{label}.timeout_ms must be greater than zero."),
			});
		}
	}

	if cfg.providers.embedding.model.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.model must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == Some(0) {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero when set."
				.to_string(),
		});
	}
	if cfg
		.providers
		.extraction
		.chunking_strategy
		.as_deref()
		.is_some_and(|strategy| strategy.trim().is_empty())
	{
		return Err(Error::Validation {
			message: "providers.extraction.chunking_strategy must be non-empty when set."
				.to_string(),
		});
	}
	if cfg.providers.extraction.max_characters == 0 {
		return Err(Error::Validation {
			message: "providers.extraction.max_characters must be greater than zero.".to_string(),
		});
	}

	for (label, headers) in [
		("embedding", &cfg.providers.embedding.default_headers),
		("extraction", &cfg.providers.extraction.default_headers),
	] {
		if headers.values().any(|value| !value.is_string()) {
			return Err(Error::Validation {
				message: format!("providers.{label}.default_headers values must be strings."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.service.log_level.trim().is_empty() {
		cfg.service.log_level = "info".to_string();
	}

	cfg.documents.search_dirs.retain(|dir| !dir.trim().is_empty());

	for api_base in
		[&mut cfg.providers.embedding.api_base, &mut cfg.providers.extraction.api_base]
	{
		let trimmed = api_base.trim().trim_end_matches('/').to_string();

		*api_base = trimmed;
	}
}
