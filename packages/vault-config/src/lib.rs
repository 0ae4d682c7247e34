mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, Duplicate, Related, Search, Service, Sync, Tagging, Topic, Vault};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(path, &raw)
}

pub fn parse(path: &Path, raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.log_level.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.log_level must be non-empty.".to_string(),
		});
	}

	for (label, value) in [
		("tagging.min_semantic_similarity", cfg.tagging.min_semantic_similarity),
		("search.similarity_threshold", cfg.search.similarity_threshold),
		("duplicate.similarity_threshold", cfg.duplicate.similarity_threshold),
		("topic.similarity_threshold", cfg.topic.similarity_threshold),
		("related.similarity_threshold", cfg.related.similarity_threshold),
	] {
		if !value.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if !(0.0..=1.0).contains(&value) {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 0.0-1.0."),
			});
		}
	}
	for (label, value) in [
		("search.dense_weight", cfg.search.dense_weight),
		("search.keyword_weight", cfg.search.keyword_weight),
	] {
		if !value.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if value < 0.0 {
			return Err(Error::Validation { message: format!("{label} must be zero or greater.") });
		}
	}
	for (label, value) in [
		("tagging.max_tags_per_document", cfg.tagging.max_tags_per_document),
		("search.default_top_k", cfg.search.default_top_k),
		("search.snippet_max_chars", cfg.search.snippet_max_chars),
		("duplicate.top_k", cfg.duplicate.top_k),
		("topic.default_top_k", cfg.topic.default_top_k),
		("topic.min_group_size", cfg.topic.min_group_size),
		("related.default_top_k", cfg.related.default_top_k),
		("sync.batch_size", cfg.sync.batch_size),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	// Truncation appends "...", which needs room inside the budget.
	if cfg.search.snippet_max_chars < 4 {
		return Err(Error::Validation {
			message: "search.snippet_max_chars must be at least 4.".to_string(),
		});
	}
	if cfg.related.section_title.is_empty() {
		return Err(Error::Validation {
			message: "related.section_title must be non-empty.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.vault.root.as_deref().map(|root| root.trim().is_empty()).unwrap_or(false) {
		cfg.vault.root = None;
	}

	let title = cfg.related.section_title.trim();

	if title.len() != cfg.related.section_title.len() {
		cfg.related.section_title = title.to_string();
	}
}
