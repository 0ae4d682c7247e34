use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use vault_domain::{relevance, snippet};

use crate::{IndexHit, IndexMetadata, VaultService};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchMode {
	#[default]
	Semantic,
	Keyword,
	Hybrid,
}
impl SearchMode {
	/// Case-insensitive. Unknown names fall back to semantic search.
	pub fn parse(raw: &str) -> Self {
		match raw.trim().to_ascii_uppercase().as_str() {
			"KEYWORD" => Self::Keyword,
			"HYBRID" => Self::Hybrid,
			_ => Self::Semantic,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Semantic => "SEMANTIC",
			Self::Keyword => "KEYWORD",
			Self::Hybrid => "HYBRID",
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
	pub text: String,
	/// Zero uses the configured default.
	pub top_k: usize,
	/// Zero or less uses the configured default.
	pub similarity_threshold: f64,
	/// Keep hits having a tag that contains any of these, case-insensitively.
	pub tags: Vec<String>,
	/// Drop hits whose path contains any of these. Empty entries are ignored.
	pub exclude_paths: Vec<String>,
	pub mode: SearchMode,
}
impl SearchQuery {
	pub fn new(text: impl Into<String>) -> Self {
		Self { text: text.into(), ..Default::default() }
	}

	pub fn with_mode(mut self, mode: SearchMode) -> Self {
		self.mode = mode;

		self
	}

	pub fn with_top_k(mut self, top_k: usize) -> Self {
		self.top_k = top_k;

		self
	}

	pub fn with_threshold(mut self, threshold: f64) -> Self {
		self.similarity_threshold = threshold;

		self
	}

	pub fn with_tags(mut self, tags: Vec<String>) -> Self {
		self.tags = tags;

		self
	}

	pub fn with_exclude_paths(mut self, exclude_paths: Vec<String>) -> Self {
		self.exclude_paths = exclude_paths;

		self
	}

	pub(crate) fn accepts(&self, metadata: &IndexMetadata) -> bool {
		let path = metadata.file_path.as_str();

		if self
			.exclude_paths
			.iter()
			.any(|excluded| !excluded.is_empty() && path.contains(excluded.as_str()))
		{
			return false;
		}
		if self.tags.is_empty() {
			return true;
		}

		let doc_tags =
			metadata.tag_list().into_iter().map(|tag| tag.to_lowercase()).collect::<Vec<_>>();

		self.tags.iter().any(|wanted| {
			let wanted = wanted.to_lowercase();

			doc_tags.iter().any(|tag| tag.contains(&wanted))
		})
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
	pub path: String,
	pub title: String,
	pub score: f64,
	pub snippet: String,
	pub tags: Vec<String>,
	pub word_count: usize,
}

impl VaultService {
	/// Runs one search. Retrieval failures produce an empty list.
	pub async fn search(&self, query: &SearchQuery) -> Vec<SearchResult> {
		let cfg = &self.cfg.search;
		let (top_k, threshold) =
			resolve_limits(query, cfg.default_top_k, cfg.similarity_threshold);
		let results = match query.mode {
			SearchMode::Semantic => self.semantic_search(query, top_k, threshold).await,
			SearchMode::Keyword => self.keyword_search(query, top_k, threshold).await,
			SearchMode::Hybrid => self.hybrid_search(query, top_k, threshold).await,
		};

		tracing::debug!(
			mode = query.mode.as_str(),
			top_k,
			threshold,
			result_count = results.len(),
			"Search completed."
		);

		results
	}

	async fn semantic_search(
		&self,
		query: &SearchQuery,
		top_k: usize,
		threshold: f64,
	) -> Vec<SearchResult> {
		self.filtered_hits(query, top_k, threshold)
			.await
			.into_iter()
			.map(|hit| {
				let score = hit.score;

				self.to_result(hit, &query.text, score)
			})
			.collect()
	}

	async fn keyword_search(
		&self,
		query: &SearchQuery,
		top_k: usize,
		threshold: f64,
	) -> Vec<SearchResult> {
		let keywords = relevance::keywords_from_query(&query.text);
		let mut results = self
			.filtered_hits(query, top_k.saturating_mul(2), threshold)
			.await
			.into_iter()
			.filter_map(|hit| {
				let score = keyword_score(&hit, &keywords);

				(score > 0.0).then(|| self.to_result(hit, &query.text, score))
			})
			.collect::<Vec<_>>();

		results.sort_by(|a, b| cmp_f64_desc(a.score, b.score));
		results.truncate(top_k);

		results
	}

	async fn hybrid_search(
		&self,
		query: &SearchQuery,
		top_k: usize,
		threshold: f64,
	) -> Vec<SearchResult> {
		let keywords = relevance::keywords_from_query(&query.text);
		let hits = self.filtered_hits(query, top_k.saturating_mul(2), threshold).await;
		let keyword_scores =
			hits.iter().map(|hit| keyword_score(hit, &keywords)).collect::<Vec<_>>();
		let max_keyword = keyword_scores.iter().copied().fold(0.0_f64, f64::max);
		let dense_weight = self.cfg.search.dense_weight;
		let keyword_weight = self.cfg.search.keyword_weight;
		let mut results = hits
			.into_iter()
			.zip(keyword_scores)
			.map(|(hit, keyword)| {
				let normalized = if max_keyword > 0.0 { keyword / max_keyword } else { 0.0 };
				let score = hybrid_score(hit.score, normalized, dense_weight, keyword_weight);

				self.to_result(hit, &query.text, score)
			})
			.collect::<Vec<_>>();

		results.sort_by(|a, b| cmp_f64_desc(a.score, b.score));
		results.truncate(top_k);

		results
	}

	async fn filtered_hits(
		&self,
		query: &SearchQuery,
		top_k: usize,
		threshold: f64,
	) -> Vec<IndexHit> {
		match self.retrieve(&query.text, top_k, threshold).await {
			Ok(hits) => hits.into_iter().filter(|hit| query.accepts(&hit.metadata)).collect(),
			Err(err) => {
				tracing::warn!(
					error = %err,
					mode = query.mode.as_str(),
					"Search retrieval failed."
				);

				Vec::new()
			},
		}
	}

	fn to_result(&self, hit: IndexHit, query_text: &str, score: f64) -> SearchResult {
		let snippet =
			snippet::generate_snippet(&hit.text, query_text, self.cfg.search.snippet_max_chars);
		let tags = hit.metadata.tag_list();

		SearchResult {
			path: hit.metadata.file_path,
			title: hit.metadata.title,
			score,
			snippet,
			tags,
			word_count: hit.metadata.word_count,
		}
	}
}

pub fn hybrid_score(
	dense: f64,
	normalized_keyword: f64,
	dense_weight: f64,
	keyword_weight: f64,
) -> f64 {
	dense * dense_weight + normalized_keyword * keyword_weight
}

/// Descending order with NaN sorted last.
pub fn cmp_f64_desc(a: f64, b: f64) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}

pub(crate) fn resolve_limits(
	query: &SearchQuery,
	default_top_k: usize,
	default_threshold: f64,
) -> (usize, f64) {
	let top_k = if query.top_k > 0 { query.top_k } else { default_top_k };
	let threshold = if query.similarity_threshold > 0.0 {
		query.similarity_threshold
	} else {
		default_threshold
	};

	(top_k, threshold)
}

fn keyword_score(hit: &IndexHit, keywords: &[String]) -> f64 {
	relevance::score(&hit.metadata.title, &hit.metadata.tag_list(), &hit.text, keywords)
}
