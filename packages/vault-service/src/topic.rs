use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
	SearchMode, SearchQuery, SearchResult, TagCount, VaultService, count_tags, search, top_tags,
};

pub const LEFTOVER_GROUP: &str = "기타";

const STATISTICS_TAG_LIMIT: usize = 20;
const RELATED_TOPIC_LIMIT: usize = 10;
const RELATED_TOPIC_MIN_COUNT: usize = 2;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicRequest {
	pub topic: String,
	/// Zero uses the configured default.
	pub top_k: usize,
	/// Zero or less uses the configured default.
	pub similarity_threshold: f64,
	/// Zero disables the filter.
	pub min_word_count: usize,
	pub filter_tags: Vec<String>,
}
impl TopicRequest {
	pub fn new(topic: impl Into<String>) -> Self {
		Self { topic: topic.into(), ..Default::default() }
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopicDocument {
	pub path: String,
	pub title: String,
	pub score: f64,
	pub tags: Vec<String>,
	pub word_count: usize,
	pub snippet: String,
}
impl From<SearchResult> for TopicDocument {
	fn from(result: SearchResult) -> Self {
		Self {
			path: result.path,
			title: result.title,
			score: result.score,
			tags: result.tags,
			word_count: result.word_count,
			snippet: result.snippet,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopicGroup {
	pub tag_name: String,
	pub documents: Vec<TopicDocument>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopicStatistics {
	pub min_word_count: usize,
	pub max_word_count: usize,
	pub avg_word_count: f64,
	pub tag_frequency: Vec<TagCount>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TopicCollection {
	pub topic: String,
	pub total_documents: usize,
	pub groups: Vec<TopicGroup>,
	pub statistics: TopicStatistics,
	pub related_topics: Vec<String>,
}

impl VaultService {
	/// Collects documents about a topic and partitions them by their most common tags.
	pub async fn collect_topic(&self, request: &TopicRequest) -> TopicCollection {
		let cfg = &self.cfg.topic;
		let query = SearchQuery {
			text: request.topic.clone(),
			top_k: request.top_k,
			similarity_threshold: request.similarity_threshold,
			tags: request.filter_tags.clone(),
			exclude_paths: Vec::new(),
			mode: SearchMode::Semantic,
		};
		let (top_k, threshold) =
			search::resolve_limits(&query, cfg.default_top_k, cfg.similarity_threshold);
		let query = query.with_top_k(top_k).with_threshold(threshold);

		tracing::info!(topic = %request.topic, top_k, "Collecting topic.");

		let documents = self
			.search(&query)
			.await
			.into_iter()
			.filter(|result| {
				request.min_word_count == 0 || result.word_count >= request.min_word_count
			})
			.map(TopicDocument::from)
			.collect::<Vec<_>>();
		let collection = group_documents(&request.topic, documents, cfg.min_group_size);

		tracing::info!(
			topic = %request.topic,
			document_count = collection.total_documents,
			group_count = collection.groups.len(),
			"Topic collected."
		);

		collection
	}
}

/// Partitions documents by tag frequency.
///
/// Tags seen at least `min_group_size` times claim their unassigned documents, most frequent
/// first. A claim smaller than `min_group_size` is abandoned and its documents stay available.
/// Whatever is left forms the leftover group.
pub fn group_documents(
	topic: &str,
	documents: Vec<TopicDocument>,
	min_group_size: usize,
) -> TopicCollection {
	let counts = count_tags(documents.iter().flat_map(|doc| doc.tags.iter()));
	let significant = top_tags(&counts_at_least(&counts, min_group_size), usize::MAX);
	let mut assigned = HashSet::<String>::new();
	let mut groups = Vec::new();

	for entry in &significant {
		let claimed = documents
			.iter()
			.filter(|doc| !assigned.contains(&doc.path) && doc.tags.contains(&entry.tag))
			.cloned()
			.collect::<Vec<_>>();

		if claimed.len() >= min_group_size {
			assigned.extend(claimed.iter().map(|doc| doc.path.clone()));
			groups.push(TopicGroup { tag_name: entry.tag.clone(), documents: claimed });
		}
	}

	let leftover =
		documents.iter().filter(|doc| !assigned.contains(&doc.path)).cloned().collect::<Vec<_>>();

	if !leftover.is_empty() {
		groups.push(TopicGroup { tag_name: LEFTOVER_GROUP.to_string(), documents: leftover });
	}

	let statistics = statistics(&documents, &counts);
	let related_topics =
		top_tags(&counts_at_least(&counts, RELATED_TOPIC_MIN_COUNT), RELATED_TOPIC_LIMIT)
			.into_iter()
			.map(|entry| entry.tag)
			.collect();

	TopicCollection {
		topic: topic.to_string(),
		total_documents: documents.len(),
		groups,
		statistics,
		related_topics,
	}
}

fn counts_at_least(counts: &[TagCount], min: usize) -> Vec<TagCount> {
	counts.iter().filter(|entry| entry.count >= min).cloned().collect()
}

fn statistics(documents: &[TopicDocument], counts: &[TagCount]) -> TopicStatistics {
	let word_counts = documents.iter().map(|doc| doc.word_count).collect::<Vec<_>>();
	let avg_word_count = if word_counts.is_empty() {
		0.0
	} else {
		word_counts.iter().sum::<usize>() as f64 / word_counts.len() as f64
	};

	TopicStatistics {
		min_word_count: word_counts.iter().copied().min().unwrap_or(0),
		max_word_count: word_counts.iter().copied().max().unwrap_or(0),
		avg_word_count,
		tag_frequency: top_tags(counts, STATISTICS_TAG_LIMIT),
	}
}
