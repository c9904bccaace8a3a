use unicode_segmentation::UnicodeSegmentation;

/// Characters ignored when judging whether text carries content.
const FILLER_CHARS: &[char] =
	&['-', '_', '=', '.', ',', ';', ':', '!', '?', '(', ')', '[', ']', '{', '}'];
const MIN_ALPHABETIC_RATIO: f64 = 0.3;

#[derive(Clone, Debug)]
pub struct ChunkingConfig {
	pub max_chars: usize,
	pub min_meaningful_chars: usize,
}

/// Packs whole sentences into chunks of at most `cfg.max_chars` characters. A sentence that
/// alone exceeds the budget is cut on word boundaries, and a single word that still exceeds
/// it is cut on character boundaries. Whitespace-only pieces are dropped.
pub fn split_text(text: &str, cfg: &ChunkingConfig) -> Vec<String> {
	let max_chars = cfg.max_chars.max(1);
	let mut pieces = Vec::new();

	for sentence in text.split_sentence_bounds() {
		if sentence.chars().count() <= max_chars {
			pieces.push(sentence);
		} else {
			tracing::debug!(
				chars = sentence.chars().count(),
				max_chars,
				"Sentence exceeds chunk budget; splitting on word boundaries."
			);

			for word in sentence.split_word_bounds() {
				hard_split(word, max_chars, &mut pieces);
			}
		}
	}

	let mut chunks = Vec::new();
	let mut current = String::new();
	let mut current_chars = 0_usize;

	for piece in pieces {
		let piece_chars = piece.chars().count();

		if current_chars + piece_chars > max_chars && !current.is_empty() {
			push_chunk(&mut chunks, &current);

			current.clear();

			current_chars = 0;
		}

		current.push_str(piece);

		current_chars += piece_chars;
	}

	if !current.is_empty() {
		push_chunk(&mut chunks, &current);
	}

	chunks
}

/// True when `text` has at least `min_chars` characters besides whitespace and filler
/// punctuation, and more than 30% of those are alphabetic.
pub fn is_meaningful(text: &str, min_chars: usize) -> bool {
	let mut total = 0_usize;
	let mut alphabetic = 0_usize;

	for ch in text.chars().filter(|ch| !ch.is_whitespace() && !FILLER_CHARS.contains(ch)) {
		total += 1;

		if ch.is_alphabetic() {
			alphabetic += 1;
		}
	}

	total > 0 && total >= min_chars && (alphabetic as f64 / total as f64) > MIN_ALPHABETIC_RATIO
}

fn hard_split<'a>(word: &'a str, max_chars: usize, out: &mut Vec<&'a str>) {
	let mut start = 0_usize;
	let mut count = 0_usize;

	for (byte_idx, _) in word.char_indices() {
		if count == max_chars {
			out.push(&word[start..byte_idx]);

			start = byte_idx;
			count = 0;
		}

		count += 1;
	}

	if start < word.len() {
		out.push(&word[start..]);
	}
}

fn push_chunk(chunks: &mut Vec<String>, text: &str) {
	if !text.trim().is_empty() {
		chunks.push(text.to_string());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn cfg(max_chars: usize) -> ChunkingConfig {
		ChunkingConfig { max_chars, min_meaningful_chars: 10 }
	}

	#[test]
	fn packs_sentences_under_budget() {
		let text = "One two three. Four five six. Seven eight nine.";
		let chunks = split_text(text, &cfg(32));

		assert_eq!(chunks.len(), 2);
		assert_eq!(chunks[0], "One two three. Four five six. ");
		assert_eq!(chunks[1], "Seven eight nine.");
		assert_eq!(chunks.concat(), text);
	}

	#[test]
	fn keeps_short_text_whole() {
		let chunks = split_text("Short text.", &cfg(2_000));

		assert_eq!(chunks.len(), 1);
		assert_eq!(chunks[0], "Short text.");
	}

	#[test]
	fn never_exceeds_budget_for_long_words() {
		let text = "x".repeat(25);
		let chunks = split_text(&text, &cfg(10));

		assert_eq!(chunks.len(), 3);
		assert!(chunks.iter().all(|chunk| chunk.chars().count() <= 10));
		assert_eq!(chunks.concat(), text);
	}

	#[test]
	fn splits_multibyte_text_on_char_boundaries() {
		let text = "é".repeat(7);
		let chunks = split_text(&text, &cfg(3));

		assert_eq!(chunks.len(), 3);
		assert_eq!(chunks[2], "é");
	}

	#[test]
	fn meaningful_text_needs_letters() {
		assert!(is_meaningful("Revenue grew by 12 percent.", 10));
		assert!(!is_meaningful("1234 5678 9012 3456", 10));
		assert!(!is_meaningful("-- . -- . -- . --", 10));
		assert!(!is_meaningful("Too short", 10));
		assert!(!is_meaningful("", 0));
	}
}
