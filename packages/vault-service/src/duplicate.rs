use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{DocumentSummary, VaultService, take_chars};

const SEED_SIMILARITY: f64 = 1.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DuplicateDocument {
	pub path: String,
	pub title: String,
	pub word_count: usize,
	pub similarity: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
	pub master: DuplicateDocument,
	pub duplicates: Vec<DuplicateDocument>,
	pub average_similarity: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DuplicateAnalysis {
	pub total_documents_scanned: usize,
	pub duplicate_group_count: usize,
	pub groups: Vec<DuplicateGroup>,
}

impl VaultService {
	/// Loads the whole vault and clusters near-duplicate documents.
	pub async fn detect_duplicates(&self) -> DuplicateAnalysis {
		let paths = self.list_vault().await;
		let documents = self.load_documents(&paths).await;

		tracing::info!(file_count = paths.len(), "Scanning vault for duplicates.");

		self.cluster_duplicates(documents).await
	}

	/// Greedy single-link clustering seeded in input order.
	///
	/// A seed whose own search finds nothing stays unvisited and is never searched again, though
	/// a later seed may still absorb it. Every path lands in at most one group.
	pub async fn cluster_duplicates(&self, documents: Vec<DocumentSummary>) -> DuplicateAnalysis {
		let cfg = &self.cfg.duplicate;
		let documents = documents
			.into_iter()
			.filter(|doc| doc.word_count >= cfg.min_word_count)
			.collect::<Vec<_>>();
		let mut visited = HashSet::<String>::new();
		let mut groups = Vec::new();

		tracing::debug!(
			document_count = documents.len(),
			min_word_count = cfg.min_word_count,
			"Filtered duplicate candidates."
		);

		for doc in &documents {
			if visited.contains(&doc.path) {
				continue;
			}

			let query = take_chars(&doc.content, cfg.query_chars);
			let hits = match self.retrieve(query, cfg.top_k, cfg.similarity_threshold).await {
				Ok(hits) => hits,
				Err(err) => {
					tracing::warn!(error = %err, path = %doc.path, "Similarity search failed.");

					continue;
				},
			};
			let mut seen = HashSet::new();
			let matches = hits
				.into_iter()
				.filter(|hit| {
					let path = &hit.metadata.file_path;

					*path != doc.path && !visited.contains(path) && seen.insert(path.clone())
				})
				.map(|hit| DuplicateDocument {
					path: hit.metadata.file_path,
					title: hit.metadata.title,
					word_count: hit.metadata.word_count,
					similarity: hit.score,
				})
				.collect::<Vec<_>>();

			if matches.is_empty() {
				continue;
			}

			visited.insert(doc.path.clone());
			visited.extend(matches.iter().map(|found| found.path.clone()));

			let seed = DuplicateDocument {
				path: doc.path.clone(),
				title: doc.title.clone(),
				word_count: doc.word_count,
				similarity: SEED_SIMILARITY,
			};

			groups.push(build_group(seed, matches));
		}

		tracing::info!(
			document_count = documents.len(),
			group_count = groups.len(),
			"Duplicate scan completed."
		);

		DuplicateAnalysis {
			total_documents_scanned: documents.len(),
			duplicate_group_count: groups.len(),
			groups,
		}
	}
}

/// The largest document becomes master, the first one on ties. Average similarity covers the
/// non-master members, so a seed that loses the master role contributes its own 1.0.
fn build_group(seed: DuplicateDocument, matches: Vec<DuplicateDocument>) -> DuplicateGroup {
	let mut members = Vec::with_capacity(matches.len() + 1);

	members.push(seed);
	members.extend(matches);

	let mut master_idx = 0;

	for (idx, member) in members.iter().enumerate() {
		if member.word_count > members[master_idx].word_count {
			master_idx = idx;
		}
	}

	let master = members.remove(master_idx);
	let duplicates =
		members.into_iter().filter(|member| member.path != master.path).collect::<Vec<_>>();
	let average_similarity = if duplicates.is_empty() {
		0.0
	} else {
		duplicates.iter().map(|member| member.similarity).sum::<f64>() / duplicates.len() as f64
	};

	DuplicateGroup { master, duplicates, average_similarity }
}
