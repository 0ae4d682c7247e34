use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
	pub service: Service,
	pub vault: Vault,
	pub tagging: Tagging,
	pub search: Search,
	pub duplicate: Duplicate,
	pub topic: Topic,
	pub related: Related,
	pub sync: Sync,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Service {
	/// `EnvFilter` directive, e.g. "info" or "vault_service=debug".
	pub log_level: String,
}
impl Default for Service {
	fn default() -> Self {
		Self { log_level: "info".to_string() }
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Vault {
	/// Optional. Related-document links are written relative to this directory.
	pub root: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Tagging {
	pub max_tags_per_document: usize,
	pub min_semantic_similarity: f64,
	pub max_topic_tags: usize,
	pub max_doctype_tags: usize,
	pub max_source_tags: usize,
	pub max_pattern_tags: usize,
	pub max_framework_tags: usize,
	pub similar_top_k: usize,
	pub similar_query_chars: usize,
}
impl Default for Tagging {
	fn default() -> Self {
		Self {
			max_tags_per_document: 10,
			min_semantic_similarity: 0.3,
			max_topic_tags: 4,
			max_doctype_tags: 1,
			max_source_tags: 1,
			max_pattern_tags: 3,
			max_framework_tags: 2,
			similar_top_k: 5,
			similar_query_chars: 500,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Search {
	pub default_top_k: usize,
	pub similarity_threshold: f64,
	pub dense_weight: f64,
	pub keyword_weight: f64,
	pub snippet_max_chars: usize,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			default_top_k: 10,
			similarity_threshold: 0.3,
			dense_weight: 0.7,
			keyword_weight: 0.3,
			snippet_max_chars: 200,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Duplicate {
	pub similarity_threshold: f64,
	pub min_word_count: usize,
	pub top_k: usize,
	pub query_chars: usize,
}
impl Default for Duplicate {
	fn default() -> Self {
		Self { similarity_threshold: 0.85, min_word_count: 50, top_k: 20, query_chars: 1_000 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Topic {
	pub default_top_k: usize,
	pub similarity_threshold: f64,
	pub min_group_size: usize,
}
impl Default for Topic {
	fn default() -> Self {
		Self { default_top_k: 50, similarity_threshold: 0.3, min_group_size: 2 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Related {
	pub default_top_k: usize,
	pub similarity_threshold: f64,
	pub section_title: String,
	pub query_chars: usize,
}
impl Default for Related {
	fn default() -> Self {
		Self {
			default_top_k: 5,
			similarity_threshold: 0.3,
			section_title: "## 관련 문서".to_string(),
			query_chars: 500,
		}
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Sync {
	pub batch_size: usize,
}
impl Default for Sync {
	fn default() -> Self {
		Self { batch_size: 10 }
	}
}
