pub mod analysis;
pub mod duplicate;
pub mod related;
pub mod search;
pub mod sync;
pub mod tagging;
pub mod topic;

mod error;

pub use analysis::{TagAnalysis, VaultStatistics};
pub use duplicate::{DuplicateAnalysis, DuplicateDocument, DuplicateGroup};
pub use error::{Error, Result};
pub use related::{RelatedDocument, RelatedSectionResult};
pub use search::{SearchMode, SearchQuery, SearchResult};
pub use sync::{SyncReport, content_hash};
pub use tagging::{BatchTaggingResult, TaggingResult};
pub use topic::{TopicCollection, TopicDocument, TopicGroup, TopicRequest, TopicStatistics};

use std::{future::Future, pin::Pin, sync::Arc};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use vault_config::Config;
use vault_domain::tag::TagRuleEngine;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Ranked retrieval over the indexed vault. Scores are similarities in `0.0..=1.0`, best first.
pub trait VectorIndex
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		query: &'a IndexQuery,
	) -> BoxFuture<'a, color_eyre::Result<Vec<IndexHit>>>;

	fn add<'a>(&'a self, docs: &'a [IndexDocument]) -> BoxFuture<'a, color_eyre::Result<()>>;

	fn delete<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, color_eyre::Result<()>>;
}

/// Supplies parsed vault documents, both as stored and cleaned.
pub trait DocumentSource
where
	Self: Send + Sync,
{
	fn list<'a>(
		&'a self,
		folder: &'a str,
		recursive: bool,
	) -> BoxFuture<'a, color_eyre::Result<Vec<String>>>;

	fn list_all<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<Vec<String>>>;

	fn load<'a>(&'a self, path: &'a str) -> BoxFuture<'a, color_eyre::Result<DocumentSummary>>;
}

/// Persists derived data back into vault documents.
pub trait FileWriter
where
	Self: Send + Sync,
{
	fn update_front_matter<'a>(
		&'a self,
		path: &'a str,
		fields: &'a Map<String, Value>,
	) -> BoxFuture<'a, color_eyre::Result<()>>;

	/// Replaces the body under `title`, appending the section when it does not exist yet.
	fn replace_section<'a>(
		&'a self,
		path: &'a str,
		title: &'a str,
		body: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<()>>;
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexQuery {
	pub text: String,
	pub top_k: usize,
	pub min_score: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
	pub file_path: String,
	pub title: String,
	/// Comma-separated.
	pub tags: String,
	pub word_count: usize,
}
impl IndexMetadata {
	pub fn tag_list(&self) -> Vec<String> {
		split_csv(&self.tags)
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexHit {
	pub id: String,
	pub text: String,
	pub score: f64,
	pub metadata: IndexMetadata,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
	pub id: String,
	pub text: String,
	pub file_hash: String,
	pub metadata: IndexMetadata,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
	pub path: String,
	pub title: String,
	/// Cleaned body text without front matter or markdown syntax.
	pub content: String,
	/// The file as stored, front matter and markdown included.
	pub raw_content: String,
	pub tags: Vec<String>,
	pub word_count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
	pub tag: String,
	pub count: usize,
}

#[derive(Clone)]
pub struct Providers {
	pub index: Arc<dyn VectorIndex>,
	pub source: Arc<dyn DocumentSource>,
	pub writer: Arc<dyn FileWriter>,
}
impl Providers {
	pub fn new(
		index: Arc<dyn VectorIndex>,
		source: Arc<dyn DocumentSource>,
		writer: Arc<dyn FileWriter>,
	) -> Self {
		Self { index, source, writer }
	}
}

pub struct VaultService {
	pub cfg: Config,
	pub providers: Providers,
	pub tags: TagRuleEngine,
}
impl VaultService {
	pub fn new(cfg: Config, providers: Providers) -> Self {
		let tags = TagRuleEngine::from_config(&cfg.tagging);

		Self { cfg, providers, tags }
	}

	pub(crate) async fn retrieve(
		&self,
		text: &str,
		top_k: usize,
		min_score: f64,
	) -> Result<Vec<IndexHit>> {
		let query = IndexQuery { text: text.to_string(), top_k, min_score };

		self.providers.index.search(&query).await.map_err(Error::retrieval)
	}

	pub(crate) async fn load_document(&self, path: &str) -> Result<DocumentSummary> {
		self.providers.source.load(path).await.map_err(Error::parse)
	}

	/// Every vault path, or none when the listing fails.
	pub(crate) async fn list_vault(&self) -> Vec<String> {
		match self.providers.source.list_all().await {
			Ok(paths) => paths,
			Err(err) => {
				tracing::warn!(error = %err, "Vault listing failed.");

				Vec::new()
			},
		}
	}

	/// Loads each path in order, skipping documents that fail to parse.
	pub(crate) async fn load_documents(&self, paths: &[String]) -> Vec<DocumentSummary> {
		let mut documents = Vec::with_capacity(paths.len());

		for path in paths {
			match self.load_document(path).await {
				Ok(document) => documents.push(document),
				Err(err) => {
					tracing::warn!(error = %err, path = %path, "Skipping unreadable document.");
				},
			}
		}

		documents
	}
}

/// Splits a comma-separated list, trimming entries and dropping empty ones.
pub fn split_csv(raw: &str) -> Vec<String> {
	raw.split(',').map(str::trim).filter(|item| !item.is_empty()).map(str::to_string).collect()
}

/// Occurrence counts in first-seen order. Repeats within one list count each time.
pub(crate) fn count_tags<'a, I>(tags: I) -> Vec<TagCount>
where
	I: IntoIterator<Item = &'a String>,
{
	let mut counts = Vec::<TagCount>::new();

	for tag in tags {
		match counts.iter_mut().find(|entry| entry.tag == *tag) {
			Some(entry) => entry.count += 1,
			None => counts.push(TagCount { tag: tag.clone(), count: 1 }),
		}
	}

	counts
}

/// Highest counts first, first-seen order on ties.
pub(crate) fn top_tags(counts: &[TagCount], limit: usize) -> Vec<TagCount> {
	let mut sorted = counts.to_vec();

	sorted.sort_by(|a, b| b.count.cmp(&a.count));
	sorted.truncate(limit);

	sorted
}

pub(crate) fn take_chars(text: &str, count: usize) -> &str {
	match text.char_indices().nth(count) {
		Some((idx, _)) => &text[..idx],
		None => text,
	}
}
