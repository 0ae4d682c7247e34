use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use vault_domain::tag::{self, CategorizedTags};

use crate::{Error, Result, VaultService, split_csv, take_chars};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TaggingResult {
	pub path: String,
	pub original_tags: Vec<String>,
	pub generated_tags: Vec<String>,
	pub categorized_tags: CategorizedTags,
	pub success: bool,
	pub error_message: Option<String>,
}
impl TaggingResult {
	fn failed(path: &str, err: &Error) -> Self {
		Self {
			path: path.to_string(),
			original_tags: Vec::new(),
			generated_tags: Vec::new(),
			categorized_tags: CategorizedTags::new(),
			success: false,
			error_message: Some(err.to_string()),
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BatchTaggingResult {
	pub folder: String,
	pub total_files: usize,
	pub successful: usize,
	pub failed: usize,
	pub results: Vec<TaggingResult>,
}

impl VaultService {
	/// Derives tags for one document and, unless `dry_run`, writes them to its front matter.
	///
	/// Candidates come from documents similar to the cleaned content, plus the file name, the
	/// markdown headers and keyword coverage of the raw file. Failures are reported in the result,
	/// never raised.
	pub async fn tag_document(&self, path: &str, dry_run: bool) -> TaggingResult {
		match self.tag_document_inner(path, dry_run).await {
			Ok(result) => result,
			Err(err) => {
				tracing::warn!(error = %err, path = %path, "Tagging failed.");

				TaggingResult::failed(path, &err)
			},
		}
	}

	/// Tags every document in `folder` one at a time. A failed document never stops the batch.
	pub async fn tag_folder(
		&self,
		folder: &str,
		recursive: bool,
		dry_run: bool,
	) -> BatchTaggingResult {
		let paths = match self.providers.source.list(folder, recursive).await {
			Ok(paths) => paths,
			Err(err) => {
				tracing::warn!(error = %err, folder = %folder, "Folder listing failed.");

				return BatchTaggingResult { folder: folder.to_string(), ..Default::default() };
			},
		};

		tracing::info!(folder = %folder, file_count = paths.len(), dry_run, "Batch tagging.");

		let mut results = Vec::with_capacity(paths.len());

		for path in &paths {
			results.push(self.tag_document(path, dry_run).await);
		}

		let successful = results.iter().filter(|result| result.success).count();

		tracing::info!(
			folder = %folder,
			successful,
			total = results.len(),
			"Batch tagging completed."
		);

		BatchTaggingResult {
			folder: folder.to_string(),
			total_files: results.len(),
			successful,
			failed: results.len() - successful,
			results,
		}
	}

	async fn tag_document_inner(&self, path: &str, dry_run: bool) -> Result<TaggingResult> {
		if path.trim().is_empty() {
			return Err(Error::InvalidRequest { message: "path must be non-empty.".to_string() });
		}

		let document = self.load_document(path).await?;
		let mut candidates = self.similar_document_tags(&document.content).await;
		let file_name =
			Path::new(path).file_name().map(|name| name.to_string_lossy()).unwrap_or_default();

		candidates.extend(tag::pattern_tags(&file_name, &document.raw_content));
		candidates.extend(tag::topic_tags(&document.raw_content));

		let cleaned = tag::clean_tags(&candidates);
		let generated = self.tags.limit_count(&cleaned, self.cfg.tagging.max_tags_per_document);
		let categorized_tags = self.tags.categorize(&generated);

		if !dry_run && !generated.is_empty() {
			let mut fields = Map::new();

			fields.insert(
				"tags".to_string(),
				Value::Array(generated.iter().cloned().map(Value::String).collect()),
			);

			self.providers.writer.update_front_matter(path, &fields).await.map_err(Error::write)?;
		}

		tracing::debug!(path = %path, tag_count = generated.len(), dry_run, "Document tagged.");

		Ok(TaggingResult {
			path: path.to_string(),
			original_tags: document.tags,
			generated_tags: generated,
			categorized_tags,
			success: true,
			error_message: None,
		})
	}

	/// Tags carried by documents similar to `content`. Retrieval failures contribute nothing.
	async fn similar_document_tags(&self, content: &str) -> Vec<String> {
		let cfg = &self.cfg.tagging;
		let query = take_chars(content, cfg.similar_query_chars);

		match self.retrieve(query, cfg.similar_top_k, cfg.min_semantic_similarity).await {
			Ok(hits) => hits.iter().flat_map(|hit| split_csv(&hit.metadata.tags)).collect(),
			Err(err) => {
				tracing::debug!(error = %err, "Similar document search failed.");

				Vec::new()
			},
		}
	}
}
