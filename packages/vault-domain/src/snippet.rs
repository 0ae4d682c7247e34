use std::sync::LazyLock;

use regex::Regex;

pub const DEFAULT_MAX_CHARS: usize = 200;

const ELLIPSIS: &str = "...";

static SENTENCE_BREAK: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[.!?\n]+").expect("Sentence pattern must compile."));

/// Picks the sentence that mentions the most query words (longer than two characters).
///
/// Ties go to the earliest sentence. A sentence longer than `max_chars` is cut and suffixed with
/// an ellipsis so the result stays within the budget. The result never exceeds `max_chars`.
pub fn generate_snippet(content: &str, query: &str, max_chars: usize) -> String {
	if content.trim().is_empty() {
		return String::new();
	}

	let query_words = query
		.to_lowercase()
		.split_whitespace()
		.filter(|word| word.chars().count() > 2)
		.map(str::to_string)
		.collect::<Vec<_>>();
	let sentences = SENTENCE_BREAK
		.split(content)
		.filter(|sentence| !sentence.trim().is_empty())
		.collect::<Vec<_>>();
	let Some(first) = sentences.first() else {
		return take_chars(content, max_chars).to_string();
	};
	let mut best = *first;
	let mut best_hits = 0;

	for (idx, sentence) in sentences.iter().copied().enumerate() {
		let lower = sentence.to_lowercase();
		let hits = query_words.iter().filter(|word| lower.contains(word.as_str())).count();

		if idx == 0 || hits > best_hits {
			best = sentence;
			best_hits = hits;
		}
	}

	if best.chars().count() > max_chars {
		// Budgets too small for the ellipsis get a plain cut.
		if max_chars <= ELLIPSIS.len() {
			return take_chars(best, max_chars).to_string();
		}

		let cut = take_chars(best, max_chars - ELLIPSIS.len());

		format!("{cut}{ELLIPSIS}")
	} else {
		best.trim().to_string()
	}
}

fn take_chars(text: &str, count: usize) -> &str {
	match text.char_indices().nth(count) {
		Some((idx, _)) => &text[..idx],
		None => text,
	}
}
