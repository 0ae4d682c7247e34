use vault_config::Config;
use vault_testkit::{MemorySource, RecordingWriter, ScriptedIndex, document, hit};

use super::{assert_close, harness, harness_with_writer};

const PATH: &str = "/vault/notes/kotlin.md";

fn config() -> Config {
	let mut cfg = Config::default();

	cfg.vault.root = Some("/vault".to_string());

	cfg
}

fn neighbors() -> ScriptedIndex {
	ScriptedIndex::new().fallback(vec![
		hit(PATH, "Kotlin", 0.99, &["kotlin"], 100),
		hit("/vault/notes/coroutines.md", "Coroutines", 0.81, &["kotlin", "async"], 80),
		hit("/vault/spring.md", "", 0.7, &[], 60),
		hit("/vault/rust.md", "Rust", 0.6, &[], 60),
	])
}

fn source() -> MemorySource {
	MemorySource::new().with_document(document(PATH, "Kotlin", "kotlin coroutines guide", &[]))
}

#[tokio::test]
async fn related_documents_exclude_the_document_itself() {
	let h = harness(config(), neighbors(), source());
	let related = h.service.find_related(PATH, 2).await;

	assert_eq!(
		related.iter().map(|doc| doc.path.as_str()).collect::<Vec<_>>(),
		["/vault/notes/coroutines.md", "/vault/spring.md"]
	);
	assert_eq!(related[0].tags, ["kotlin", "async"]);

	let queries = h.index.queries();

	assert_eq!(queries[0].text, "kotlin coroutines guide");
	assert_eq!(queries[0].top_k, 3);
	assert_close(queries[0].min_score, 0.3);
}

#[tokio::test]
async fn zero_top_k_uses_the_default() {
	let h = harness(config(), neighbors(), source());
	let related = h.service.find_related(PATH, 0).await;

	assert_eq!(related.len(), 3);
	assert_eq!(h.index.queries()[0].top_k, 6);
}

#[tokio::test]
async fn unbounded_top_k_does_not_overflow() {
	let h = harness(config(), neighbors(), source());
	let related = h.service.find_related(PATH, usize::MAX).await;

	assert_eq!(related.len(), 3);
	assert_eq!(h.index.queries()[0].top_k, usize::MAX);
}

#[tokio::test]
async fn lookup_failures_yield_no_related_documents() {
	let h = harness(config(), neighbors().fail_search(), source());

	assert!(h.service.find_related(PATH, 3).await.is_empty());

	let h = harness(config(), neighbors(), MemorySource::new());

	assert!(h.service.find_related(PATH, 3).await.is_empty());
}

#[tokio::test]
async fn section_is_written_with_vault_relative_links() {
	let h = harness(config(), neighbors(), source());
	let result = h.service.update_related_section(PATH, 2).await;

	assert!(result.success);
	assert!(result.section_added);
	assert_eq!(result.related.len(), 2);

	let sections = h.writer.sections();

	assert_eq!(sections.len(), 1);
	assert_eq!(sections[0].path, PATH);
	assert_eq!(sections[0].title, "## 관련 문서");
	assert_eq!(
		sections[0].body,
		"- [[notes/coroutines|Coroutines]] (유사도: 0.81)\n- [[spring|spring]] (유사도: 0.70)\n"
	);
}

#[tokio::test]
async fn no_neighbors_means_no_section() {
	let index = ScriptedIndex::new().fallback(vec![hit(PATH, "Kotlin", 0.99, &[], 100)]);
	let h = harness(config(), index, source());
	let result = h.service.update_related_section(PATH, 5).await;

	assert!(result.success);
	assert!(!result.section_added);
	assert!(result.related.is_empty());
	assert!(h.writer.sections().is_empty());
}

#[tokio::test]
async fn section_write_failure_is_reported() {
	let writer = RecordingWriter::new().fail_writes();
	let h = harness_with_writer(config(), neighbors(), source(), writer);
	let result = h.service.update_related_section(PATH, 2).await;

	assert!(!result.success);
	assert!(!result.section_added);
	assert!(result.error_message.is_some_and(|message| message.starts_with("Write error")));
}
