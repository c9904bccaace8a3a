use std::{
	fs,
	path::{Path, PathBuf},
};

use clap::Parser;
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;

use sift_domain::{Request, Response};
use sift_service::SiftService;

/// Rank document fragments for a persona and task.
#[derive(Debug, Parser)]
#[command(
	version = sift_cli::VERSION,
	rename_all = "kebab",
	styles = sift_cli::styles(),
)]
pub struct Args {
	/// Request JSON with documents, persona and job to be done.
	#[arg(value_name = "INPUT_FILE")]
	pub input_file: PathBuf,
	/// Directory holding the requested documents.
	#[arg(value_name = "DOCUMENTS_PATH")]
	pub documents_path: PathBuf,
	/// Write the response here instead of stdout.
	#[arg(long, short = 'o', value_name = "FILE")]
	pub output: Option<PathBuf>,
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: Option<PathBuf>,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = match &args.config {
		Some(path) => sift_config::load(path)?,
		None => sift_config::defaults(),
	};
	let filter = EnvFilter::new(config.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	let service = SiftService::new(config)?;

	run_with_service(&args, &service).await?;

	Ok(())
}

/// Reads the request, runs the pipeline and writes the response. Returned for callers that
/// want to inspect it.
pub async fn run_with_service(args: &Args, service: &SiftService) -> color_eyre::Result<Response> {
	if !args.input_file.is_file() {
		return Err(eyre::eyre!("Input file not found: {}.", args.input_file.display()));
	}
	if !args.documents_path.is_dir() {
		return Err(eyre::eyre!(
			"Documents path is not a directory: {}.",
			args.documents_path.display()
		));
	}

	let raw = fs::read_to_string(&args.input_file)?;
	let request = Request::from_json(&raw)
		.map_err(|err| eyre::eyre!("Failed to parse request {}: {err}.", args.input_file.display()))?;
	let response = service.process_request(&request, &args.documents_path).await?;
	let json = serde_json::to_string_pretty(&response)?;

	match &args.output {
		Some(path) => write_output(path, &json)?,
		None => println!("{json}"),
	}

	tracing::info!(
		sections = response.extracted_sections.len(),
		errors = response.metadata.errors.len(),
		seconds = response.metadata.processing_time_seconds,
		"Request complete."
	);

	Ok(response)
}

fn write_output(path: &Path, json: &str) -> color_eyre::Result<()> {
	if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
		fs::create_dir_all(parent)?;
	}

	fs::write(path, json)?;

	Ok(())
}
