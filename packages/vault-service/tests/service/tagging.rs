use serde_json::json;

use vault_config::Config;
use vault_domain::tag::TagCategory;
use vault_testkit::{MemorySource, RecordingWriter, ScriptedIndex, document, hit, stored_document};

use super::{assert_close, harness, harness_with_writer};

const STORED: &str =
	"---\ntags: [draft]\n---\n# Architecture overview\nspring framework test unit data";
const CLEANED: &str = "Architecture overview\nspring framework test unit data";

fn tagged_index() -> ScriptedIndex {
	ScriptedIndex::new().fallback(vec![hit(
		"notes/similar.md",
		"Similar",
		0.8,
		&["kotlin", " Clean Code", "temp"],
		100,
	)])
}

fn source() -> MemorySource {
	MemorySource::new().with_document(stored_document(
		"notes/spring-tdd.md",
		"Spring TDD",
		STORED,
		CLEANED,
		&["draft"],
	))
}

#[tokio::test]
async fn tags_are_merged_cleaned_capped_and_written() {
	let h = harness(Config::default(), tagged_index(), source());
	let result = h.service.tag_document("notes/spring-tdd.md", false).await;
	let expected = [
		"clean-code",
		"frameworks/spring-boot",
		"testing/tdd",
		"architecture/design",
		"testing/general",
		"framework/general",
	];

	assert!(result.success, "{:?}", result.error_message);
	assert_eq!(result.original_tags, ["draft"]);
	assert_eq!(result.generated_tags, expected);
	assert_eq!(result.categorized_tags[&TagCategory::Topic].len(), 4);
	assert_eq!(
		result.categorized_tags[&TagCategory::Frameworks],
		["frameworks/spring-boot", "framework/general"]
	);

	let writes = h.writer.front_matter();

	assert_eq!(writes.len(), 1);
	assert_eq!(writes[0].0, "notes/spring-tdd.md");
	assert_eq!(writes[0].1["tags"], json!(expected));

	let queries = h.index.queries();

	assert_eq!(queries[0].text, CLEANED);
	assert_eq!(queries[0].top_k, 5);
	assert_close(queries[0].min_score, 0.3);
}

#[tokio::test]
async fn headers_are_read_from_the_stored_file() {
	let source = MemorySource::new().with_document(stored_document(
		"notes/misc.md",
		"Misc",
		"# Refactoring notes\nbody",
		"Refactoring notes\nbody",
		&[],
	));
	let h = harness(Config::default(), ScriptedIndex::new(), source);
	let result = h.service.tag_document("notes/misc.md", true).await;

	assert!(result.success);
	assert_eq!(result.generated_tags, ["practices/refactoring"]);
	assert_eq!(h.index.queries()[0].text, "Refactoring notes\nbody");
}

#[tokio::test]
async fn dry_run_writes_nothing() {
	let h = harness(Config::default(), tagged_index(), source());
	let result = h.service.tag_document("notes/spring-tdd.md", true).await;

	assert!(result.success);
	assert!(!result.generated_tags.is_empty());
	assert!(h.writer.front_matter().is_empty());
}

#[tokio::test]
async fn similar_document_failure_still_tags_from_content() {
	let index = ScriptedIndex::new().fail_search();
	let h = harness(Config::default(), index, source());
	let result = h.service.tag_document("notes/spring-tdd.md", true).await;

	assert!(result.success);
	assert!(!result.generated_tags.iter().any(|tag| tag == "clean-code"));
	assert!(result.generated_tags.iter().any(|tag| tag == "testing/tdd"));
}

#[tokio::test]
async fn write_failure_is_reported() {
	let writer = RecordingWriter::new().fail_writes();
	let h = harness_with_writer(Config::default(), tagged_index(), source(), writer);
	let result = h.service.tag_document("notes/spring-tdd.md", false).await;

	assert!(!result.success);
	assert!(result.generated_tags.is_empty());
	assert!(result.error_message.is_some_and(|message| message.starts_with("Write error")));
}

#[tokio::test]
async fn unreadable_and_blank_paths_fail() {
	let source = source().with_unreadable("notes/broken.md");
	let h = harness(Config::default(), tagged_index(), source);
	let broken = h.service.tag_document("notes/broken.md", true).await;
	let blank = h.service.tag_document("  ", true).await;

	assert!(!broken.success);
	assert!(broken.error_message.is_some_and(|message| message.starts_with("Parse error")));
	assert!(!blank.success);
	assert!(blank.error_message.is_some_and(|message| message.starts_with("Invalid request")));
}

#[tokio::test]
async fn folder_tagging_counts_each_document() {
	let source = MemorySource::new()
		.with_document(document("notes/a.md", "A", "kotlin notes", &[]))
		.with_unreadable("notes/bad.md")
		.with_document(document("notes/sub/b.md", "B", "rust notes", &[]))
		.with_document(document("other/c.md", "C", "go notes", &[]));
	let h = harness(Config::default(), tagged_index(), source);
	let flat = h.service.tag_folder("notes", false, true).await;

	assert_eq!(flat.folder, "notes");
	assert_eq!(flat.total_files, 2);
	assert_eq!(flat.successful, 1);
	assert_eq!(flat.failed, 1);

	let recursive = h.service.tag_folder("notes/", true, true).await;

	assert_eq!(recursive.total_files, 3);
	assert_eq!(recursive.successful, 2);
	assert!(h.writer.front_matter().is_empty());
}

#[tokio::test]
async fn folder_listing_failure_yields_an_empty_batch() {
	let h = harness(Config::default(), tagged_index(), source().fail_listing());
	let batch = h.service.tag_folder("notes", true, false).await;

	assert_eq!(batch.folder, "notes");
	assert_eq!(batch.total_files, 0);
	assert!(batch.results.is_empty());
}
