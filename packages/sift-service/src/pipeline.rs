use std::{path::Path, time::Instant};

use sift_domain::{Request, Response};

use crate::{
	Result, SiftService, assemble,
	timing::{timed, timed_sync},
};

impl SiftService {
	/// Runs validate, formulate, process, rank and assemble. Invalid input aborts with an
	/// error; a ranking or assembly failure still yields a well-formed response carrying a
	/// single system-level failure record.
	pub async fn process_request(&self, request: &Request, base_path: &Path) -> Result<Response> {
		let started = Instant::now();

		timed_sync("validate", || sift_domain::validate(request))?;

		let query = timed_sync("formulate", || {
			Ok::<_, crate::Error>(sift_domain::formulate(&request.persona, &request.job_to_be_done))
		})?;

		tracing::info!(
			challenge_id = %request.challenge_info.challenge_id,
			documents = request.documents.len(),
			query = %query,
			"Processing request."
		);

		let processed = timed("process", async {
			Ok::<_, crate::Error>(self.coordinator.process_all(&request.documents, base_path).await)
		})
		.await?;

		tracing::info!(
			succeeded = processed.succeeded,
			failed = processed.failures.len(),
			fragments = processed.fragments.len(),
			"Documents processed."
		);

		let ranked = if processed.fragments.is_empty() {
			tracing::warn!("No fragments extracted; skipping ranking.");

			Ok(Vec::new())
		} else {
			timed("rank", self.ranker.rank(&processed.fragments, &query)).await
		};
		let failures = processed.failures;
		let assembled = ranked.and_then(|ranked| {
			timed_sync("assemble", || assemble(&ranked, request, failures, started.elapsed()))
		});

		match assembled {
			Ok(response) => Ok(response),
			Err(err) => {
				tracing::error!(
					error_code = err.code().as_str(),
					error = %err,
					"Pipeline failed after processing; emitting fallback response."
				);

				Ok(assemble::fallback(request, &err, started.elapsed()))
			},
		}
	}
}
