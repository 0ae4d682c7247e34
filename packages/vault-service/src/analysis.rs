use std::{collections::BTreeMap, path::Path};

use serde::Serialize;

use vault_domain::tag::{self, TagCategory};

use crate::{TagCount, VaultService, count_tags, top_tags};

const TOP_TAG_LIMIT: usize = 20;
const ROOT_DIRECTORY: &str = "root";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TagAnalysis {
	pub total_unique_tags: usize,
	/// Normalized tags in first-seen order.
	pub tag_frequency: Vec<TagCount>,
	pub top_tags: Vec<TagCount>,
	pub untagged_files: usize,
	pub average_tags_per_file: f64,
	pub category_distribution: BTreeMap<TagCategory, usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VaultStatistics {
	pub total_files: usize,
	pub total_word_count: u64,
	pub average_word_count: f64,
	pub files_by_extension: BTreeMap<String, usize>,
	pub files_by_directory: BTreeMap<String, usize>,
	pub tag_analysis: TagAnalysis,
}

impl VaultService {
	/// Vault-wide file, word, and tag statistics.
	///
	/// Unreadable documents still count as files but add no words or tags.
	pub async fn analyze_vault(&self) -> VaultStatistics {
		let paths = self.list_vault().await;
		let mut files_by_extension = BTreeMap::new();
		let mut files_by_directory = BTreeMap::new();
		let mut normalized_tags = Vec::new();
		let mut total_word_count = 0_u64;
		let mut total_tag_count = 0_usize;
		let mut untagged_files = 0_usize;

		tracing::info!(file_count = paths.len(), "Analyzing vault.");

		for path in &paths {
			let (extension, directory) = classify_path(path);

			*files_by_extension.entry(extension).or_insert(0) += 1;
			*files_by_directory.entry(directory).or_insert(0) += 1;

			let document = match self.load_document(path).await {
				Ok(document) => document,
				Err(err) => {
					tracing::warn!(error = %err, path = %path, "Skipping unreadable document.");

					continue;
				},
			};

			total_word_count += document.word_count as u64;

			if document.tags.is_empty() {
				untagged_files += 1;
			} else {
				total_tag_count += document.tags.len();
				normalized_tags.extend(document.tags.iter().map(|raw| tag::normalize(raw)));
			}
		}

		let tag_frequency = count_tags(&normalized_tags);
		let unique_tags = tag_frequency.iter().map(|entry| entry.tag.as_str()).collect::<Vec<_>>();
		let category_distribution = tag::categorize(&unique_tags)
			.into_iter()
			.map(|(category, tags)| (category, tags.len()))
			.collect();
		let total_files = paths.len();
		let per_file = |total: f64| if total_files > 0 { total / total_files as f64 } else { 0.0 };

		VaultStatistics {
			total_files,
			total_word_count,
			average_word_count: per_file(total_word_count as f64),
			files_by_extension,
			files_by_directory,
			tag_analysis: TagAnalysis {
				total_unique_tags: tag_frequency.len(),
				top_tags: top_tags(&tag_frequency, TOP_TAG_LIMIT),
				tag_frequency,
				untagged_files,
				average_tags_per_file: per_file(total_tag_count as f64),
				category_distribution,
			},
		}
	}
}

/// File extension (empty when absent) and parent directory name.
fn classify_path(path: &str) -> (String, String) {
	let path = Path::new(path);
	let extension =
		path.extension().map(|ext| ext.to_string_lossy().into_owned()).unwrap_or_default();
	let directory = path
		.parent()
		.and_then(Path::file_name)
		.map(|name| name.to_string_lossy().into_owned())
		.unwrap_or_else(|| ROOT_DIRECTORY.to_string());

	(extension, directory)
}
