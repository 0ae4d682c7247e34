//! In-memory doubles for the `vault-service` provider traits.

mod error;

pub use error::{Error, Result};

use std::{
	collections::{HashMap, HashSet},
	sync::{
		Mutex, MutexGuard,
		atomic::{AtomicBool, Ordering},
	},
};

use color_eyre::Report;
use serde_json::{Map, Value};

use vault_service::{
	BoxFuture, DocumentSource, DocumentSummary, FileWriter, IndexDocument, IndexHit,
	IndexMetadata, IndexQuery, VectorIndex,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|err| err.into_inner())
}

fn injected(operation: &'static str) -> Report {
	Report::new(Error::Injected { operation })
}

/// Builds a hit whose id is its path.
pub fn hit(path: &str, title: &str, score: f64, tags: &[&str], word_count: usize) -> IndexHit {
	IndexHit {
		id: path.to_string(),
		text: String::new(),
		score,
		metadata: IndexMetadata {
			file_path: path.to_string(),
			title: title.to_string(),
			tags: tags.join(","),
			word_count,
		},
	}
}

/// A document whose stored text is identical to its cleaned text.
pub fn document(path: &str, title: &str, content: &str, tags: &[&str]) -> DocumentSummary {
	stored_document(path, title, content, content, tags)
}

/// A document with distinct stored and cleaned text. Word count follows the cleaned text.
pub fn stored_document(
	path: &str,
	title: &str,
	raw_content: &str,
	content: &str,
	tags: &[&str],
) -> DocumentSummary {
	DocumentSummary {
		path: path.to_string(),
		title: title.to_string(),
		content: content.to_string(),
		raw_content: raw_content.to_string(),
		tags: tags.iter().map(|tag| tag.to_string()).collect(),
		word_count: content.split_whitespace().count(),
	}
}

/// Vector index answering from scripted responses keyed by exact query text.
///
/// Unscripted queries return the fallback hits. Responses honor the requested `top_k` and
/// `min_score` the way a real index would.
#[derive(Default)]
pub struct ScriptedIndex {
	responses: Mutex<HashMap<String, Vec<IndexHit>>>,
	failing_queries: Mutex<HashSet<String>>,
	fallback: Mutex<Vec<IndexHit>>,
	queries: Mutex<Vec<IndexQuery>>,
	added: Mutex<Vec<Vec<IndexDocument>>>,
	deleted: Mutex<Vec<Vec<String>>>,
	fail_search: AtomicBool,
	fail_add: AtomicBool,
	fail_delete: AtomicBool,
}
impl ScriptedIndex {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn respond(self, text: &str, hits: Vec<IndexHit>) -> Self {
		lock(&self.responses).insert(text.to_string(), hits);

		self
	}

	pub fn fallback(self, hits: Vec<IndexHit>) -> Self {
		*lock(&self.fallback) = hits;

		self
	}

	pub fn fail_query(self, text: &str) -> Self {
		lock(&self.failing_queries).insert(text.to_string());

		self
	}

	pub fn fail_search(self) -> Self {
		self.fail_search.store(true, Ordering::SeqCst);

		self
	}

	pub fn fail_add(self) -> Self {
		self.fail_add.store(true, Ordering::SeqCst);

		self
	}

	pub fn fail_delete(self) -> Self {
		self.fail_delete.store(true, Ordering::SeqCst);

		self
	}

	pub fn queries(&self) -> Vec<IndexQuery> {
		lock(&self.queries).clone()
	}

	pub fn added(&self) -> Vec<Vec<IndexDocument>> {
		lock(&self.added).clone()
	}

	pub fn deleted(&self) -> Vec<Vec<String>> {
		lock(&self.deleted).clone()
	}

	fn answer(&self, query: &IndexQuery) -> color_eyre::Result<Vec<IndexHit>> {
		lock(&self.queries).push(query.clone());

		let scripted_failure = lock(&self.failing_queries).contains(&query.text);

		if scripted_failure || self.fail_search.load(Ordering::SeqCst) {
			return Err(injected("search"));
		}

		let hits = lock(&self.responses)
			.get(&query.text)
			.cloned()
			.unwrap_or_else(|| lock(&self.fallback).clone());

		Ok(hits.into_iter().filter(|hit| hit.score >= query.min_score).take(query.top_k).collect())
	}
}
impl VectorIndex for ScriptedIndex {
	fn search<'a>(
		&'a self,
		query: &'a IndexQuery,
	) -> BoxFuture<'a, color_eyre::Result<Vec<IndexHit>>> {
		let result = self.answer(query);

		Box::pin(async move { result })
	}

	fn add<'a>(&'a self, docs: &'a [IndexDocument]) -> BoxFuture<'a, color_eyre::Result<()>> {
		let result = if self.fail_add.load(Ordering::SeqCst) {
			Err(injected("add"))
		} else {
			lock(&self.added).push(docs.to_vec());

			Ok(())
		};

		Box::pin(async move { result })
	}

	fn delete<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, color_eyre::Result<()>> {
		lock(&self.deleted).push(ids.to_vec());

		let result =
			if self.fail_delete.load(Ordering::SeqCst) { Err(injected("delete")) } else { Ok(()) };

		Box::pin(async move { result })
	}
}

/// Document source over an ordered in-memory list.
#[derive(Default)]
pub struct MemorySource {
	documents: Vec<DocumentSummary>,
	unreadable: HashSet<String>,
	listing_order: Vec<String>,
	fail_listing: bool,
}
impl MemorySource {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_document(mut self, document: DocumentSummary) -> Self {
		self.listing_order.push(document.path.clone());
		self.documents.push(document);

		self
	}

	/// Listed like any other path, but loading it fails.
	pub fn with_unreadable(mut self, path: &str) -> Self {
		self.listing_order.push(path.to_string());
		self.unreadable.insert(path.to_string());

		self
	}

	pub fn fail_listing(mut self) -> Self {
		self.fail_listing = true;

		self
	}

	fn lookup(&self, path: &str) -> Result<DocumentSummary> {
		if self.unreadable.contains(path) {
			return Err(Error::Unreadable { path: path.to_string() });
		}

		self.documents
			.iter()
			.find(|doc| doc.path == path)
			.cloned()
			.ok_or_else(|| Error::NotFound { path: path.to_string() })
	}

	fn listing(&self, folder: Option<&str>, recursive: bool) -> color_eyre::Result<Vec<String>> {
		if self.fail_listing {
			return Err(injected("list"));
		}

		let Some(folder) = folder else {
			return Ok(self.listing_order.clone());
		};
		let prefix = format!("{}/", folder.trim_end_matches('/'));

		Ok(self
			.listing_order
			.iter()
			.filter(|path| {
				path.strip_prefix(&prefix).is_some_and(|rest| recursive || !rest.contains('/'))
			})
			.cloned()
			.collect())
	}
}
impl DocumentSource for MemorySource {
	fn list<'a>(
		&'a self,
		folder: &'a str,
		recursive: bool,
	) -> BoxFuture<'a, color_eyre::Result<Vec<String>>> {
		Box::pin(async move { self.listing(Some(folder), recursive) })
	}

	fn list_all<'a>(&'a self) -> BoxFuture<'a, color_eyre::Result<Vec<String>>> {
		Box::pin(async move { self.listing(None, true) })
	}

	fn load<'a>(&'a self, path: &'a str) -> BoxFuture<'a, color_eyre::Result<DocumentSummary>> {
		Box::pin(async move { self.lookup(path).map_err(Report::new) })
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct SectionWrite {
	pub path: String,
	pub title: String,
	pub body: String,
}

/// File writer that records every call instead of touching the file system.
#[derive(Default)]
pub struct RecordingWriter {
	front_matter: Mutex<Vec<(String, Map<String, Value>)>>,
	sections: Mutex<Vec<SectionWrite>>,
	fail_writes: AtomicBool,
}
impl RecordingWriter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn fail_writes(self) -> Self {
		self.fail_writes.store(true, Ordering::SeqCst);

		self
	}

	pub fn front_matter(&self) -> Vec<(String, Map<String, Value>)> {
		lock(&self.front_matter).clone()
	}

	pub fn sections(&self) -> Vec<SectionWrite> {
		lock(&self.sections).clone()
	}
}
impl FileWriter for RecordingWriter {
	fn update_front_matter<'a>(
		&'a self,
		path: &'a str,
		fields: &'a Map<String, Value>,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		let result = if self.fail_writes.load(Ordering::SeqCst) {
			Err(injected("front matter write"))
		} else {
			lock(&self.front_matter).push((path.to_string(), fields.clone()));

			Ok(())
		};

		Box::pin(async move { result })
	}

	fn replace_section<'a>(
		&'a self,
		path: &'a str,
		title: &'a str,
		body: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<()>> {
		let result = if self.fail_writes.load(Ordering::SeqCst) {
			Err(injected("section write"))
		} else {
			lock(&self.sections).push(SectionWrite {
				path: path.to_string(),
				title: title.to_string(),
				body: body.to_string(),
			});

			Ok(())
		};

		Box::pin(async move { result })
	}
}
