pub const TITLE_WEIGHT: f64 = 3.0;
pub const TAG_WEIGHT: f64 = 2.0;
pub const CONTENT_WEIGHT: f64 = 1.0;
pub const MAX_CONTENT_SCORE: f64 = 5.0;

/// Lexical relevance of a document to a keyword list.
///
/// Each keyword contributes a title bonus, a tag bonus, and a capped content-frequency bonus. The
/// sum is scaled by the fraction of keywords that contributed anything, so documents covering more
/// of the query rank above documents that repeat a single term.
pub fn score<S, K>(title: &str, tags: &[S], content: &str, keywords: &[K]) -> f64
where
	S: AsRef<str>,
	K: AsRef<str>,
{
	if keywords.is_empty() {
		return 0.0;
	}

	let title = title.to_lowercase();
	let tags = tags.iter().map(|tag| tag.as_ref().to_lowercase()).collect::<Vec<_>>();
	let content = content.to_lowercase();
	let mut total = 0.0;
	let mut matched = 0_usize;

	for keyword in keywords {
		let keyword = keyword.as_ref().to_lowercase();
		let mut keyword_score = 0.0;

		if title.contains(&keyword) {
			keyword_score += TITLE_WEIGHT;
		}
		if tags.iter().any(|tag| tag.contains(&keyword)) {
			keyword_score += TAG_WEIGHT;
		}

		let frequency = count_occurrences(&content, &keyword);

		if frequency > 0 {
			keyword_score += (CONTENT_WEIGHT * frequency as f64).min(MAX_CONTENT_SCORE);
		}
		if keyword_score > 0.0 {
			matched += 1;
		}

		total += keyword_score;
	}

	total * (matched as f64 / keywords.len() as f64)
}

/// Non-overlapping, left-to-right occurrence count. An empty needle never matches.
pub fn count_occurrences(text: &str, needle: &str) -> usize {
	if needle.is_empty() {
		return 0;
	}

	text.matches(needle).count()
}

/// Whitespace-separated query words longer than one character, in query order.
pub fn keywords_from_query(query: &str) -> Vec<String> {
	query.split_whitespace().filter(|word| word.chars().count() > 1).map(str::to_string).collect()
}
