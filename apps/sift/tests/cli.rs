use std::sync::Arc;

use clap::Parser;

use sift::Args;
use sift_domain::ErrorCode;
use sift_service::{Providers, SiftService};
use sift_testkit::{KeywordEmbedding, Script, ScriptedExtraction, TestDocuments};

const REQUEST: &str = r#"{
	"challenge_info": {"challenge_id": "round_1b_003", "test_case_name": "create_manageable_forms"},
	"documents": [
		{"filename": "forms.pdf", "title": "Fillable Forms"},
		{"filename": "missing.pdf", "title": "Missing"}
	],
	"persona": {"role": "HR professional"},
	"job_to_be_done": {"task": "Create and manage fillable forms for onboarding."}
}"#;

fn providers() -> Providers {
	let extraction = ScriptedExtraction::new([(
		"forms.pdf",
		Script::Texts(vec![
			"To create fillable forms, choose Prepare a form.".to_string(),
			"Signatures can be requested from recipients.".to_string(),
		]),
	)]);

	Providers::new(Arc::new(KeywordEmbedding::new(&["form", "fillable"])), Arc::new(extraction))
}

fn service() -> SiftService {
	SiftService::with_providers(sift_config::defaults(), providers())
}

#[test]
fn parses_positional_and_optional_arguments() {
	let args = Args::try_parse_from(["sift", "in.json", "docs", "-o", "out.json", "--config", "sift.toml"])
		.expect("Arguments must parse.");

	assert_eq!(args.input_file.to_str(), Some("in.json"));
	assert_eq!(args.documents_path.to_str(), Some("docs"));
	assert_eq!(args.output.as_deref().and_then(|path| path.to_str()), Some("out.json"));
	assert_eq!(args.config.as_deref().and_then(|path| path.to_str()), Some("sift.toml"));
	assert!(Args::try_parse_from(["sift", "in.json"]).is_err());
}

#[tokio::test]
async fn writes_response_file() {
	let docs = TestDocuments::new("cli").expect("Failed to create documents dir.");
	let input = docs.write("request.json", REQUEST).expect("Failed to write request.");
	let output = docs.path().join("out").join("response.json");
	let args = Args {
		input_file: input,
		documents_path: docs.path().to_path_buf(),
		output: Some(output.clone()),
		config: None,
	};
	let response = sift::run_with_service(&args, &service())
		.await
		.expect("Run must succeed.");
	let written: serde_json::Value = serde_json::from_str(
		&std::fs::read_to_string(&output).expect("Failed to read response file."),
	)
	.expect("Response file must be JSON.");

	assert_eq!(response.extracted_sections.len(), 2);
	assert_eq!(response.metadata.errors[0].error_code, ErrorCode::FileNotFound);
	assert_eq!(written["metadata"]["persona"], "HR professional");
	assert_eq!(written["metadata"]["errors"][0]["error_code"], "E404_FILE_NOT_FOUND");
	assert_eq!(written["extracted_sections"][0]["document"], "forms.pdf");
	assert_eq!(written["extracted_sections"][0]["section_title"], "Untitled Section");

	let root = docs.path().to_path_buf();

	docs.cleanup().expect("Failed to remove documents dir.");

	assert!(!root.exists());
}

#[tokio::test]
async fn rejects_missing_paths_and_bad_requests() {
	let docs = TestDocuments::new("cli_errors").expect("Failed to create documents dir.");
	let missing_input = Args {
		input_file: docs.path().join("nope.json"),
		documents_path: docs.path().to_path_buf(),
		output: None,
		config: None,
	};

	assert!(sift::run_with_service(&missing_input, &service()).await.is_err());

	let input = docs.write("request.json", REQUEST).expect("Failed to write request.");
	let missing_dir = Args {
		input_file: input,
		documents_path: docs.path().join("absent"),
		output: None,
		config: None,
	};

	assert!(sift::run_with_service(&missing_dir, &service()).await.is_err());

	let broken = docs.write("broken.json", "{\"documents\": ").expect("Failed to write request.");
	let bad_json = Args {
		input_file: broken,
		documents_path: docs.path().to_path_buf(),
		output: None,
		config: None,
	};

	assert!(sift::run_with_service(&bad_json, &service()).await.is_err());

	let empty = docs
		.write(
			"empty.json",
			r#"{"challenge_info": {"challenge_id": "x", "test_case_name": "y"}, "documents": [],
			"persona": {"role": "Analyst"}, "job_to_be_done": {"task": "Summarize"}}"#,
		)
		.expect("Failed to write request.");
	let invalid = Args {
		input_file: empty,
		documents_path: docs.path().to_path_buf(),
		output: None,
		config: None,
	};

	assert!(sift::run_with_service(&invalid, &service()).await.is_err());
}
