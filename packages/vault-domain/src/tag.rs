use std::{
	cmp::Reverse,
	collections::{BTreeMap, HashSet},
	sync::LazyLock,
};

use regex::Regex;
use serde::Serialize;

use vault_config::Tagging;

const MIN_LENGTH: usize = 2;
const MAX_LENGTH: usize = 50;
const MAX_HIERARCHY_DEPTH: usize = 4;
const DEVELOPMENT_PREFIX: &str = "development/";
const FORBIDDEN_PREFIXES: [&str; 2] = ["resources/", "slipbox/"];
const FORBIDDEN_WORDS: [&str; 4] = ["test", "temp", "tmp", "example"];

/// Keyword overrides, evaluated in order; the first rule whose keyword occurs in the tag wins.
const CATEGORY_OVERRIDES: [(TagCategory, &[&str]); 4] = [
	(TagCategory::Patterns, &["pattern", "singleton", "factory", "observer"]),
	(TagCategory::Frameworks, &["spring", "react", "vue", "framework"]),
	(TagCategory::DocumentType, &["guide", "tutorial", "reference", "example"]),
	(TagCategory::Source, &["book", "article", "video", "conference"]),
];

const ROOT_CATEGORIES: [(&str, TagCategory); 39] = [
	("architecture", TagCategory::Topic),
	("design", TagCategory::Topic),
	("tdd", TagCategory::Topic),
	("testing", TagCategory::Topic),
	("refactoring", TagCategory::Topic),
	("clean-code", TagCategory::Topic),
	("oop", TagCategory::Topic),
	("ddd", TagCategory::Topic),
	("microservices", TagCategory::Topic),
	("api", TagCategory::Topic),
	("database", TagCategory::Topic),
	("security", TagCategory::Topic),
	("performance", TagCategory::Topic),
	("guide", TagCategory::DocumentType),
	("tutorial", TagCategory::DocumentType),
	("reference", TagCategory::DocumentType),
	("examples", TagCategory::DocumentType),
	("notes", TagCategory::DocumentType),
	("summary", TagCategory::DocumentType),
	("book", TagCategory::Source),
	("article", TagCategory::Source),
	("video", TagCategory::Source),
	("conference", TagCategory::Source),
	("blog", TagCategory::Source),
	("documentation", TagCategory::Source),
	("patterns", TagCategory::Patterns),
	("singleton", TagCategory::Patterns),
	("factory", TagCategory::Patterns),
	("observer", TagCategory::Patterns),
	("strategy", TagCategory::Patterns),
	("template", TagCategory::Patterns),
	("frameworks", TagCategory::Frameworks),
	("spring", TagCategory::Frameworks),
	("spring-boot", TagCategory::Frameworks),
	("react", TagCategory::Frameworks),
	("vue", TagCategory::Frameworks),
	("angular", TagCategory::Frameworks),
	("django", TagCategory::Frameworks),
	("fastapi", TagCategory::Frameworks),
];

/// Ordered: partial matching returns the first key contained in the concept.
const CONCEPT_HIERARCHIES: [(&str, &str); 12] = [
	("spring", "frameworks/spring-boot"),
	("test", "testing/unit"),
	("tdd", "testing/tdd"),
	("architecture", "architecture/design"),
	("pattern", "patterns/design-patterns"),
	("refactor", "practices/refactoring"),
	("clean", "practices/clean-code"),
	("database", "data/database"),
	("api", "architecture/api"),
	("microservice", "architecture/microservices"),
	("security", "security/general"),
	("performance", "performance/optimization"),
];

const GLOBAL_PRIORITY: [TagCategory; 5] = [
	TagCategory::DocumentType,
	TagCategory::Topic,
	TagCategory::Frameworks,
	TagCategory::Patterns,
	TagCategory::Source,
];

const TOPIC_KEYWORDS: [(&str, &[&str]); 5] = [
	("architecture", &["architecture", "design", "pattern", "structure"]),
	("development", &["development", "coding", "programming", "implementation"]),
	("testing", &["test", "testing", "tdd", "unit", "integration"]),
	("framework", &["spring", "react", "vue", "angular", "framework"]),
	("database", &["database", "sql", "query", "data", "storage"]),
];
const TOPIC_MIN_COVERAGE: f64 = 0.3;

static HEADER_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?m)^#+[ \t]+(.+)$").expect("Header pattern must compile."));

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TagCategory {
	#[serde(rename = "Topic")]
	Topic,
	#[serde(rename = "Document Type")]
	DocumentType,
	#[serde(rename = "Source")]
	Source,
	#[serde(rename = "Patterns")]
	Patterns,
	#[serde(rename = "Frameworks")]
	Frameworks,
}
impl TagCategory {
	pub const ALL: [Self; 5] =
		[Self::Topic, Self::DocumentType, Self::Source, Self::Patterns, Self::Frameworks];
}

/// Category buckets keyed in declaration order. Every category is present, possibly empty.
pub type CategorizedTags = BTreeMap<TagCategory, Vec<String>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TagLimits {
	pub topic: usize,
	pub document_type: usize,
	pub source: usize,
	pub patterns: usize,
	pub frameworks: usize,
}
impl TagLimits {
	pub fn for_category(&self, category: TagCategory) -> usize {
		match category {
			TagCategory::Topic => self.topic,
			TagCategory::DocumentType => self.document_type,
			TagCategory::Source => self.source,
			TagCategory::Patterns => self.patterns,
			TagCategory::Frameworks => self.frameworks,
		}
	}
}
impl From<&Tagging> for TagLimits {
	fn from(cfg: &Tagging) -> Self {
		Self {
			topic: cfg.max_topic_tags,
			document_type: cfg.max_doctype_tags,
			source: cfg.max_source_tags,
			patterns: cfg.max_pattern_tags,
			frameworks: cfg.max_framework_tags,
		}
	}
}

#[derive(Clone, Debug)]
pub struct TagRuleEngine {
	limits: TagLimits,
}
impl TagRuleEngine {
	pub fn new(limits: TagLimits) -> Self {
		Self { limits }
	}

	pub fn from_config(cfg: &Tagging) -> Self {
		Self::new(TagLimits::from(cfg))
	}

	pub fn normalize(&self, tag: &str) -> String {
		normalize(tag)
	}

	pub fn validate(&self, tag: &str) -> bool {
		validate(tag)
	}

	pub fn categorize<S>(&self, tags: &[S]) -> CategorizedTags
	where
		S: AsRef<str>,
	{
		categorize(tags)
	}

	pub fn apply_hierarchy<S>(&self, concepts: &[S]) -> Vec<String>
	where
		S: AsRef<str>,
	{
		concepts.iter().map(|concept| hierarchy_path(concept.as_ref())).collect()
	}

	/// Applies per-category caps, then the global cap in fixed category priority.
	///
	/// Phase one keeps a whole bucket when it fits its cap and otherwise keeps the deepest,
	/// then longest, tags. Survivors keep their input order. Phase two only runs when the
	/// survivors still exceed `max_total`, and it can drop tags that passed phase one.
	pub fn limit_count(&self, tags: &[String], max_total: usize) -> Vec<String> {
		let buckets = category_indices(tags);
		let mut selected = vec![false; tags.len()];

		for (category, indices) in &buckets {
			let cap = self.limits.for_category(*category);

			if indices.len() <= cap {
				for idx in indices {
					selected[*idx] = true;
				}

				continue;
			}

			let mut ranked = indices.clone();

			ranked.sort_by_key(|idx| {
				let tag = &tags[*idx];

				(Reverse(hierarchy_depth(tag)), Reverse(tag.chars().count()))
			});

			for idx in ranked.into_iter().take(cap) {
				selected[idx] = true;
			}
		}

		let kept = selected.iter().filter(|keep| **keep).count();

		if kept <= max_total {
			return tags
				.iter()
				.zip(&selected)
				.filter(|(_, keep)| **keep)
				.map(|(tag, _)| tag.clone())
				.collect();
		}

		let mut out = Vec::with_capacity(max_total);

		for category in GLOBAL_PRIORITY {
			let Some(indices) = buckets.get(&category) else { continue };

			for idx in indices {
				if selected[*idx] && out.len() < max_total {
					out.push(tags[*idx].clone());
				}
			}
		}

		out
	}
}

/// Canonical tag form. Stable under repeated application.
pub fn normalize(tag: &str) -> String {
	let mut normalized = normalize_once(tag);

	// Cleanup can expose a prefix that the first pass did not see, e.g. "dev@elopment/x".
	while normalized.starts_with(DEVELOPMENT_PREFIX) {
		normalized = normalize_once(&normalized);
	}

	normalized
}

pub fn validate(tag: &str) -> bool {
	if tag.trim().is_empty() {
		return false;
	}

	let length = tag.chars().count();

	if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
		return false;
	}
	if !tag.chars().all(|ch| matches!(ch, 'a'..='z' | '0'..='9' | '-' | '/')) {
		return false;
	}
	if hierarchy_depth(tag) > MAX_HIERARCHY_DEPTH {
		return false;
	}
	if FORBIDDEN_PREFIXES.iter().any(|prefix| tag.starts_with(*prefix)) {
		return false;
	}
	if tag.split(['-', '/']).any(|word| FORBIDDEN_WORDS.contains(&word)) {
		return false;
	}

	true
}

pub fn categorize<S>(tags: &[S]) -> CategorizedTags
where
	S: AsRef<str>,
{
	let mut out: CategorizedTags =
		TagCategory::ALL.into_iter().map(|category| (category, Vec::new())).collect();

	for tag in tags {
		let tag = tag.as_ref();

		out.entry(category_of(tag)).or_default().push(tag.to_string());
	}

	out
}

pub fn category_of(tag: &str) -> TagCategory {
	for (category, keywords) in CATEGORY_OVERRIDES {
		if keywords.iter().any(|keyword| tag.contains(*keyword)) {
			return category;
		}
	}

	let root = tag.split_once('/').map(|(root, _)| root).unwrap_or(tag);

	ROOT_CATEGORIES
		.iter()
		.find(|(name, _)| *name == root)
		.map(|(_, category)| *category)
		.unwrap_or(TagCategory::Topic)
}

pub fn hierarchy_path(concept: &str) -> String {
	let lower = concept.to_lowercase();

	if let Some((_, path)) = CONCEPT_HIERARCHIES.iter().find(|(key, _)| *key == lower) {
		return path.to_string();
	}
	if let Some((_, path)) = CONCEPT_HIERARCHIES.iter().find(|(key, _)| lower.contains(*key)) {
		return path.to_string();
	}

	let normalized = normalize(concept);

	if validate(&normalized) { format!("topic/{normalized}") } else { normalized }
}

/// Tags suggested by a file name and its markdown headers.
pub fn pattern_tags(file_name: &str, content: &str) -> Vec<String> {
	let file_name = file_name.to_lowercase();
	let mut tags = Vec::new();

	if file_name.contains("spring") {
		tags.push("frameworks/spring-boot".to_string());
	}
	if file_name.contains("tdd") || file_name.contains("test") {
		tags.push("testing/tdd".to_string());
	}
	if file_name.contains("clean") && file_name.contains("code") {
		tags.push("practices/clean-code".to_string());
	}

	let headers = HEADER_PATTERN
		.captures_iter(content)
		.filter_map(|caps| caps.get(1))
		.map(|header| header.as_str().trim_end_matches('\r').to_lowercase())
		.collect::<Vec<_>>()
		.join(" ");

	if headers.contains("architecture") {
		tags.push("architecture/design".to_string());
	}
	if headers.contains("refactor") {
		tags.push("practices/refactoring".to_string());
	}
	if headers.contains("pattern") {
		tags.push("patterns/design-patterns".to_string());
	}

	tags
}

/// `<topic>/general` for every topic whose keyword coverage of the content exceeds 30%.
pub fn topic_tags(content: &str) -> Vec<String> {
	let content = content.to_lowercase();
	let mut tags = Vec::new();

	for (topic, keywords) in TOPIC_KEYWORDS {
		let hits = keywords.iter().filter(|keyword| content.contains(**keyword)).count();
		let coverage = hits as f64 / keywords.len() as f64;

		if coverage > TOPIC_MIN_COVERAGE {
			tags.push(format!("{topic}/general"));
		}
	}

	tags
}

/// Normalizes, drops invalid tags, and removes duplicates while keeping first occurrences.
pub fn clean_tags<I, S>(tags: I) -> Vec<String>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut seen = HashSet::new();
	let mut out = Vec::new();

	for tag in tags {
		let normalized = normalize(tag.as_ref());

		if validate(&normalized) && seen.insert(normalized.clone()) {
			out.push(normalized);
		}
	}

	out
}

pub fn hierarchy_depth(tag: &str) -> usize {
	tag.matches('/').count()
}

fn category_indices(tags: &[String]) -> BTreeMap<TagCategory, Vec<usize>> {
	let mut out: BTreeMap<TagCategory, Vec<usize>> = BTreeMap::new();

	for (idx, tag) in tags.iter().enumerate() {
		out.entry(category_of(tag)).or_default().push(idx);
	}

	out
}

fn normalize_once(tag: &str) -> String {
	let trimmed = tag.trim();

	if trimmed.is_empty() {
		return String::new();
	}

	let lower = trimmed.to_lowercase();
	let mut hyphenated = String::with_capacity(lower.len());
	let mut in_whitespace = false;

	for ch in lower.chars() {
		if matches!(ch, ' ' | '\t' | '\n' | '\r' | '\u{0B}' | '\u{0C}') {
			if !in_whitespace {
				hyphenated.push('-');
			}

			in_whitespace = true;

			continue;
		}

		in_whitespace = false;

		hyphenated.push(ch);
	}

	let stripped = hyphenated.strip_prefix(DEVELOPMENT_PREFIX).unwrap_or(&hyphenated);
	let mut collapsed = String::with_capacity(stripped.len());

	for ch in stripped.chars() {
		if !(ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '/')) {
			continue;
		}
		if matches!(ch, '-' | '/') && collapsed.ends_with(ch) {
			continue;
		}

		collapsed.push(ch);
	}

	collapsed.trim_matches('-').to_string()
}
