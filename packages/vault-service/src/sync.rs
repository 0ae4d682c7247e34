use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{DocumentSummary, IndexDocument, IndexMetadata, VaultService};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
	pub total_files: usize,
	pub processed_files: usize,
	/// Unchanged documents plus documents that could not be read.
	pub skipped_files: usize,
	pub failed_files: usize,
}

impl VaultService {
	/// Pushes changed documents into the index in fixed-size batches.
	///
	/// `known_hashes` maps a path to the file hash it was last indexed with. Documents whose
	/// hash is unchanged are skipped. A failed batch is counted as failed and the run continues.
	pub async fn sync_index(&self, known_hashes: &HashMap<String, String>) -> SyncReport {
		let paths = self.list_vault().await;
		let documents = self.load_documents(&paths).await;
		let changed = documents
			.into_iter()
			.map(to_index_document)
			.filter(|doc| known_hashes.get(&doc.id) != Some(&doc.file_hash))
			.collect::<Vec<_>>();
		let mut report = SyncReport {
			total_files: paths.len(),
			skipped_files: paths.len() - changed.len(),
			..Default::default()
		};

		if changed.is_empty() {
			tracing::info!(file_count = paths.len(), "Index is up to date.");

			return report;
		}

		tracing::info!(changed_count = changed.len(), "Syncing changed documents.");

		for batch in changed.chunks(self.cfg.sync.batch_size.max(1)) {
			let ids = batch.iter().map(|doc| doc.id.clone()).collect::<Vec<_>>();

			if let Err(err) = self.providers.index.delete(&ids).await {
				tracing::debug!(error = %err, "No indexed documents to replace.");
			}

			match self.providers.index.add(batch).await {
				Ok(()) => report.processed_files += batch.len(),
				Err(err) => {
					tracing::warn!(error = %err, batch_size = batch.len(), "Index batch failed.");

					report.failed_files += batch.len();
				},
			}
		}

		tracing::info!(
			processed = report.processed_files,
			failed = report.failed_files,
			skipped = report.skipped_files,
			"Index sync completed."
		);

		report
	}
}

/// Hex-encoded BLAKE3 digest of the whole file, so front matter edits count as changes.
pub fn content_hash(content: &str) -> String {
	blake3::hash(content.as_bytes()).to_hex().to_string()
}

fn to_index_document(doc: DocumentSummary) -> IndexDocument {
	IndexDocument {
		id: doc.path.clone(),
		file_hash: content_hash(&doc.raw_content),
		metadata: IndexMetadata {
			file_path: doc.path,
			title: doc.title,
			tags: doc.tags.join(","),
			word_count: doc.word_count,
		},
		text: doc.content,
	}
}
