use vault_config::Config;
use vault_domain::tag::TagCategory;
use vault_service::TagCount;
use vault_testkit::{MemorySource, ScriptedIndex, document};

use super::{assert_close, harness};

#[tokio::test]
async fn vault_statistics_cover_files_words_and_tags() {
	let source = MemorySource::new()
		.with_document(document(
			"/vault/notes/a.md",
			"A",
			"one two three",
			&["Kotlin", "spring-boot"],
		))
		.with_document(document("/vault/notes/b.md", "B", "four five", &[]))
		.with_document(document("/vault/c.txt", "C", "six", &["kotlin"]))
		.with_unreadable("/vault/d.md");
	let h = harness(Config::default(), ScriptedIndex::new(), source);
	let stats = h.service.analyze_vault().await;

	assert_eq!(stats.total_files, 4);
	assert_eq!(stats.total_word_count, 6);
	assert_close(stats.average_word_count, 1.5);
	assert_eq!(stats.files_by_extension["md"], 3);
	assert_eq!(stats.files_by_extension["txt"], 1);
	assert_eq!(stats.files_by_directory["notes"], 2);
	assert_eq!(stats.files_by_directory["vault"], 2);

	let tags = &stats.tag_analysis;

	assert_eq!(tags.total_unique_tags, 2);
	assert_eq!(
		tags.tag_frequency,
		[
			TagCount { tag: "kotlin".to_string(), count: 2 },
			TagCount { tag: "spring-boot".to_string(), count: 1 },
		]
	);
	assert_eq!(tags.untagged_files, 1);
	assert_close(tags.average_tags_per_file, 0.75);
	assert_eq!(tags.category_distribution[&TagCategory::Topic], 1);
	assert_eq!(tags.category_distribution[&TagCategory::Frameworks], 1);
	assert_eq!(tags.category_distribution[&TagCategory::Source], 0);
}

#[tokio::test]
async fn empty_vault_has_zero_averages() {
	let h = harness(Config::default(), ScriptedIndex::new(), MemorySource::new());
	let stats = h.service.analyze_vault().await;

	assert_eq!(stats.total_files, 0);
	assert_close(stats.average_word_count, 0.0);
	assert_close(stats.tag_analysis.average_tags_per_file, 0.0);
	assert!(stats.tag_analysis.top_tags.is_empty());
}
