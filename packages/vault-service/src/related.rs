use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result, VaultService, split_csv, take_chars};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelatedDocument {
	pub path: String,
	pub title: String,
	pub score: f64,
	pub tags: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RelatedSectionResult {
	pub path: String,
	pub related: Vec<RelatedDocument>,
	pub section_added: bool,
	pub success: bool,
	pub error_message: Option<String>,
}

impl VaultService {
	/// Documents most similar to `path`, excluding itself. Any failure yields an empty list.
	pub async fn find_related(&self, path: &str, top_k: usize) -> Vec<RelatedDocument> {
		match self.find_related_inner(path, top_k).await {
			Ok(related) => related,
			Err(err) => {
				tracing::warn!(error = %err, path = %path, "Related document lookup failed.");

				Vec::new()
			},
		}
	}

	/// Rewrites the related-documents section of `path` with wiki-links to its neighbors.
	pub async fn update_related_section(&self, path: &str, top_k: usize) -> RelatedSectionResult {
		let related = self.find_related(path, top_k).await;

		if related.is_empty() {
			return RelatedSectionResult {
				path: path.to_string(),
				related,
				section_added: false,
				success: true,
				error_message: None,
			};
		}

		let body = format_section(&related, self.cfg.vault.root.as_deref());
		let title = self.cfg.related.section_title.as_str();
		let written =
			self.providers.writer.replace_section(path, title, &body).await.map_err(Error::write);

		match written {
			Ok(()) => {
				tracing::info!(
					path = %path,
					related_count = related.len(),
					"Related section updated."
				);

				RelatedSectionResult {
					path: path.to_string(),
					related,
					section_added: true,
					success: true,
					error_message: None,
				}
			},
			Err(err) => {
				tracing::warn!(error = %err, path = %path, "Related section update failed.");

				RelatedSectionResult {
					path: path.to_string(),
					related: Vec::new(),
					section_added: false,
					success: false,
					error_message: Some(err.to_string()),
				}
			},
		}
	}

	async fn find_related_inner(&self, path: &str, top_k: usize) -> Result<Vec<RelatedDocument>> {
		let cfg = &self.cfg.related;
		let document = self.load_document(path).await?;
		let top_k = if top_k > 0 { top_k } else { cfg.default_top_k };
		let query = take_chars(&document.content, cfg.query_chars);
		let hits = self.retrieve(query, top_k.saturating_add(1), cfg.similarity_threshold).await?;

		Ok(hits
			.into_iter()
			.filter(|hit| hit.metadata.file_path != path)
			.take(top_k)
			.map(|hit| RelatedDocument {
				tags: split_csv(&hit.metadata.tags),
				path: hit.metadata.file_path,
				title: hit.metadata.title,
				score: hit.score,
			})
			.collect())
	}
}

/// One wiki-link line per document, newline-terminated.
pub fn format_section(related: &[RelatedDocument], vault_root: Option<&str>) -> String {
	let mut body = String::new();

	for doc in related {
		let title = display_title(doc);
		let link = vault_root
			.and_then(|root| link_target(root, &doc.path))
			.unwrap_or_else(|| title.clone());

		body.push_str(&format!("- [[{link}|{title}]] (유사도: {:.2})\n", doc.score));
	}

	body
}

fn display_title(doc: &RelatedDocument) -> String {
	if !doc.title.trim().is_empty() {
		return doc.title.clone();
	}

	let file_name = Path::new(&doc.path)
		.file_name()
		.map(|name| name.to_string_lossy().into_owned())
		.unwrap_or_default();

	file_name.strip_suffix(".md").map(str::to_string).unwrap_or(file_name)
}

/// Vault-relative path without the markdown extension, or `None` outside the vault.
fn link_target(root: &str, path: &str) -> Option<String> {
	let relative = Path::new(path).strip_prefix(root).ok()?;
	let relative = relative.to_string_lossy();
	let relative = relative.strip_suffix(".md").unwrap_or(&relative);
	let relative = relative.strip_suffix(".markdown").unwrap_or(relative);

	Some(relative.to_string())
}
