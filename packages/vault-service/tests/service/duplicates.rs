use std::collections::HashSet;

use vault_config::Config;
use vault_testkit::{MemorySource, ScriptedIndex, document, hit};

use super::{assert_close, harness, words};

#[tokio::test]
async fn larger_document_becomes_master() {
	let long = words("a", 200);
	let short = words("b", 150);
	let index = ScriptedIndex::new().respond(
		&long,
		vec![hit("a.md", "A", 1.0, &[], 200), hit("b.md", "B", 0.92, &[], 150)],
	);
	let source = MemorySource::new()
		.with_document(document("a.md", "A", &long, &[]))
		.with_document(document("b.md", "B", &short, &[]));
	let h = harness(Config::default(), index, source);
	let analysis = h.service.detect_duplicates().await;

	assert_eq!(analysis.total_documents_scanned, 2);
	assert_eq!(analysis.duplicate_group_count, 1);

	let group = &analysis.groups[0];

	assert_eq!(group.master.path, "a.md");
	assert_eq!(group.master.word_count, 200);
	assert_eq!(group.duplicates.len(), 1);
	assert_eq!(group.duplicates[0].path, "b.md");
	assert_close(group.average_similarity, 0.92);

	let queries = h.index.queries();

	assert_eq!(queries.len(), 1, "b.md was visited and must not seed a search.");
	assert_eq!(queries[0].top_k, 20);
	assert_close(queries[0].min_score, 0.85);
}

#[tokio::test]
async fn seeds_are_searched_by_their_leading_characters() {
	let long = words("alpha", 200);
	let prefix = long.chars().take(1_000).collect::<String>();
	let other = words("beta", 150);
	let index = ScriptedIndex::new().respond(&prefix, vec![hit("b.md", "B", 0.9, &[], 150)]);
	let source = MemorySource::new()
		.with_document(document("a.md", "A", &long, &[]))
		.with_document(document("b.md", "B", &other, &[]));
	let h = harness(Config::default(), index, source);
	let analysis = h.service.detect_duplicates().await;

	assert!(long.chars().count() > 1_000);
	assert_eq!(h.index.queries()[0].text, prefix);
	assert_eq!(analysis.duplicate_group_count, 1);
	assert_eq!(analysis.groups[0].master.path, "a.md");
}

#[tokio::test]
async fn short_documents_are_not_scanned() {
	let index = ScriptedIndex::new();
	let source = MemorySource::new()
		.with_document(document("tiny.md", "Tiny", &words("x", 10), &[]))
		.with_document(document("long.md", "Long", &words("y", 60), &[]));
	let h = harness(Config::default(), index, source);
	let analysis = h.service.detect_duplicates().await;

	assert_eq!(analysis.total_documents_scanned, 1);
	assert!(analysis.groups.is_empty());
	assert_eq!(h.index.queries().len(), 1);
}

// Clustering is direction dependent. `x.md` finds nothing from its own search, yet `y.md`
// finds it later, so the group is seeded by `y.md`.
#[tokio::test]
async fn unmatched_seed_can_be_absorbed_by_a_later_seed() {
	let x = words("x", 80);
	let y = words("y", 60);
	let index = ScriptedIndex::new()
		.respond(&x, vec![hit("x.md", "X", 1.0, &[], 80)])
		.respond(&y, vec![hit("y.md", "Y", 1.0, &[], 60), hit("x.md", "X", 0.9, &[], 80)]);
	let source = MemorySource::new()
		.with_document(document("x.md", "X", &x, &[]))
		.with_document(document("y.md", "Y", &y, &[]));
	let h = harness(Config::default(), index, source);
	let analysis = h.service.detect_duplicates().await;

	assert_eq!(analysis.duplicate_group_count, 1);

	let group = &analysis.groups[0];

	assert_eq!(group.master.path, "x.md");
	assert_eq!(group.duplicates.len(), 1);
	assert_eq!(group.duplicates[0].path, "y.md");
	assert_close(group.average_similarity, 1.0);
	assert_eq!(h.index.queries().len(), 2);
}

#[tokio::test]
async fn no_path_lands_in_two_groups() {
	let a = words("a", 100);
	let b = words("b", 90);
	let c = words("c", 80);
	let d = words("d", 70);
	let index = ScriptedIndex::new()
		.respond(&a, vec![hit("b.md", "B", 0.95, &[], 90), hit("b.md", "B", 0.9, &[], 90)])
		.respond(&c, vec![hit("b.md", "B", 0.93, &[], 90), hit("d.md", "D", 0.88, &[], 70)]);
	let source = MemorySource::new()
		.with_document(document("a.md", "A", &a, &[]))
		.with_document(document("b.md", "B", &b, &[]))
		.with_document(document("c.md", "C", &c, &[]))
		.with_document(document("d.md", "D", &d, &[]));
	let h = harness(Config::default(), index, source);
	let analysis = h.service.detect_duplicates().await;

	assert_eq!(analysis.duplicate_group_count, 2);

	let mut seen = HashSet::new();

	for group in &analysis.groups {
		for member in std::iter::once(&group.master).chain(&group.duplicates) {
			assert!(seen.insert(member.path.clone()), "{} appears twice", member.path);
		}
	}

	assert_eq!(analysis.groups[0].duplicates.len(), 1);
	assert_eq!(analysis.groups[1].master.path, "c.md");
	assert_eq!(analysis.groups[1].duplicates[0].path, "d.md");
}

#[tokio::test]
async fn failed_search_leaves_seed_unvisited() {
	let a = words("a", 100);
	let b = words("b", 120);
	let index = ScriptedIndex::new()
		.fail_query(&a)
		.respond(&b, vec![hit("a.md", "A", 0.9, &[], 100)]);
	let source = MemorySource::new()
		.with_document(document("a.md", "A", &a, &[]))
		.with_document(document("b.md", "B", &b, &[]));
	let h = harness(Config::default(), index, source);
	let analysis = h.service.detect_duplicates().await;

	assert_eq!(analysis.duplicate_group_count, 1);
	assert_eq!(analysis.groups[0].master.path, "b.md");
	assert_eq!(analysis.groups[0].duplicates[0].path, "a.md");
}

#[tokio::test]
async fn listing_failure_scans_nothing() {
	let h = harness(Config::default(), ScriptedIndex::new(), MemorySource::new().fail_listing());
	let analysis = h.service.detect_duplicates().await;

	assert_eq!(analysis.total_documents_scanned, 0);
	assert!(analysis.groups.is_empty());
}
