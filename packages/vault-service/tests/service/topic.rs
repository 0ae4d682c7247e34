use vault_config::Config;
use vault_service::{TopicRequest, topic::LEFTOVER_GROUP};
use vault_testkit::{MemorySource, ScriptedIndex, hit};

use super::{assert_close, harness};

#[tokio::test]
async fn topic_documents_are_grouped_by_shared_tags() {
	let index = ScriptedIndex::new().fallback(vec![
		hit("a.md", "A", 0.9, &["kotlin", "spring"], 100),
		hit("b.md", "B", 0.8, &["kotlin"], 300),
		hit("c.md", "C", 0.7, &["misc"], 20),
		hit("d.md", "D", 0.6, &["misc"], 80),
	]);
	let h = harness(Config::default(), index, MemorySource::new());
	let request = TopicRequest { min_word_count: 50, ..TopicRequest::new("kotlin") };
	let collection = h.service.collect_topic(&request).await;

	assert_eq!(collection.topic, "kotlin");
	assert_eq!(collection.total_documents, 3);
	assert_eq!(collection.groups.len(), 2);
	assert_eq!(collection.groups[0].tag_name, "kotlin");
	assert_eq!(
		collection.groups[0].documents.iter().map(|doc| doc.path.as_str()).collect::<Vec<_>>(),
		["a.md", "b.md"]
	);
	assert_eq!(collection.groups[1].tag_name, LEFTOVER_GROUP);
	assert_eq!(collection.groups[1].documents[0].path, "d.md");
	assert_eq!(collection.related_topics, ["kotlin"]);
	assert_eq!(collection.statistics.min_word_count, 80);
	assert_eq!(collection.statistics.max_word_count, 300);
	assert_close(collection.statistics.avg_word_count, 160.0);

	let queries = h.index.queries();

	assert_eq!(queries[0].text, "kotlin");
	assert_eq!(queries[0].top_k, 50);
	assert_close(queries[0].min_score, 0.3);
}

#[tokio::test]
async fn filter_tags_restrict_the_collection() {
	let index = ScriptedIndex::new().fallback(vec![
		hit("a.md", "A", 0.9, &["kotlin"], 100),
		hit("b.md", "B", 0.8, &["rust"], 100),
	]);
	let h = harness(Config::default(), index, MemorySource::new());
	let request = TopicRequest {
		top_k: 5,
		filter_tags: vec!["rust".to_string()],
		..TopicRequest::new("languages")
	};
	let collection = h.service.collect_topic(&request).await;

	assert_eq!(collection.total_documents, 1);
	assert_eq!(collection.groups[0].tag_name, LEFTOVER_GROUP);
	assert_eq!(h.index.queries()[0].top_k, 5);
}

#[tokio::test]
async fn retrieval_failure_yields_an_empty_collection() {
	let index = ScriptedIndex::new().fail_search();
	let h = harness(Config::default(), index, MemorySource::new());
	let collection = h.service.collect_topic(&TopicRequest::new("kotlin")).await;

	assert_eq!(collection.total_documents, 0);
	assert!(collection.groups.is_empty());
	assert!(collection.related_topics.is_empty());
	assert_eq!(collection.statistics.max_word_count, 0);
}
