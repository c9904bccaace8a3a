//! Stage timer applied once around each pipeline stage.

use std::{fmt::Display, future::Future, time::Instant};

pub async fn timed<F, T, E>(stage: &'static str, fut: F) -> Result<T, E>
where
	F: Future<Output = Result<T, E>>,
	E: Display,
{
	let started = Instant::now();
	let result = fut.await;

	record(stage, started, &result);

	result
}

pub fn timed_sync<F, T, E>(stage: &'static str, f: F) -> Result<T, E>
where
	F: FnOnce() -> Result<T, E>,
	E: Display,
{
	let started = Instant::now();
	let result = f();

	record(stage, started, &result);

	result
}

fn record<T, E>(stage: &'static str, started: Instant, result: &Result<T, E>)
where
	E: Display,
{
	let elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0;

	match result {
		Ok(_) => tracing::info!(stage, outcome = "ok", elapsed_ms, "Stage finished."),
		Err(err) =>
			tracing::warn!(stage, outcome = "error", elapsed_ms, error = %err, "Stage failed."),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn passes_results_through() {
		let ok: Result<u8, String> = timed("rank", async { Ok(7) }).await;
		let err: Result<u8, String> = timed_sync("assemble", || Err("boom".to_string()));

		assert_eq!(ok, Ok(7));
		assert_eq!(err, Err("boom".to_string()));
	}
}
