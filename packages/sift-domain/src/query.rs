use crate::{JobToBeDone, Persona};

/// Builds the ranking query from persona and task. Deterministic; the Ranker enforces the
/// minimum query length.
pub fn formulate(persona: &Persona, job: &JobToBeDone) -> String {
	let role = collapse_whitespace(&persona.role);
	let task = collapse_whitespace(&job.task);
	let task = task.trim_end_matches(['.', '!', '?', ';', ',', ':']);

	match (role.is_empty(), task.is_empty()) {
		(true, true) => String::new(),
		(false, true) => format!("As a {role}."),
		(true, false) => format!("{task}."),
		(false, false) => format!("As a {role}, {task}."),
	}
}

fn collapse_whitespace(text: &str) -> String {
	text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
	use super::*;

	fn persona(role: &str) -> Persona {
		Persona { role: role.to_string() }
	}

	fn job(task: &str) -> JobToBeDone {
		JobToBeDone { task: task.to_string() }
	}

	#[test]
	fn joins_role_and_task() {
		assert_eq!(
			formulate(&persona("  Investment   Analyst "), &job("Summarize risk factors.")),
			"As a Investment Analyst, Summarize risk factors."
		);
	}

	#[test]
	fn is_deterministic() {
		let first = formulate(&persona("Analyst"), &job("Compare revenue trends"));

		assert_eq!(first, formulate(&persona("Analyst"), &job("Compare revenue trends")));
	}

	#[test]
	fn degenerate_inputs_stay_short() {
		assert_eq!(formulate(&persona(" "), &job("\t")), "");
		assert_eq!(formulate(&persona("Chef"), &job("...")), "As a Chef.");
	}
}
