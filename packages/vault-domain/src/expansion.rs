use std::{
	collections::{HashMap, HashSet},
	sync::LazyLock,
};

use regex::Regex;
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

/// Cross-language spelling variants of one concept.
const SYNONYM_GROUPS: &[&[&str]] = &[
	// Languages.
	&["코틀린", "kotlin", "kt"],
	&["자바", "java", "jdk", "jvm"],
	&["파이썬", "python", "py"],
	&["자바스크립트", "javascript", "js", "ecmascript"],
	&["타입스크립트", "typescript", "ts"],
	&["고", "golang", "go"],
	&["러스트", "rust"],
	&["스위프트", "swift"],
	// Frameworks.
	&["스프링", "spring", "스프링부트", "spring-boot", "springboot"],
	&["리액트", "react", "reactjs"],
	&["뷰", "vue", "vuejs"],
	&["앵귤러", "angular", "angularjs"],
	&["넥스트", "next", "nextjs", "next.js"],
	&["장고", "django"],
	&["플라스크", "flask"],
	&["익스프레스", "express", "expressjs"],
	// Architecture.
	&["아키텍처", "architecture", "구조", "설계"],
	&["디자인패턴", "design-pattern", "설계패턴", "패턴"],
	&["마이크로서비스", "microservice", "msa"],
	&["모놀리스", "monolith", "모놀리식"],
	&["헥사고날", "hexagonal", "포트앤어댑터", "ports-and-adapters"],
	&["클린아키텍처", "clean-architecture", "클린"],
	&["도메인주도설계", "ddd", "domain-driven-design"],
	&["이벤트소싱", "event-sourcing", "이벤트"],
	&["cqrs", "명령조회분리"],
	// Testing.
	&["테스트", "test", "testing", "테스팅"],
	&["단위테스트", "unit-test", "유닛테스트"],
	&["통합테스트", "integration-test", "인티그레이션"],
	&["tdd", "테스트주도개발", "test-driven-development"],
	&["bdd", "행동주도개발", "behavior-driven-development"],
	&["목", "mock", "모킹", "mocking"],
	// Infrastructure.
	&["도커", "docker", "컨테이너", "container"],
	&["쿠버네티스", "kubernetes", "k8s"],
	&["ci", "cd", "cicd", "ci/cd", "지속적통합", "지속적배포"],
	&["깃", "git", "깃허브", "github"],
	&["젠킨스", "jenkins"],
	&["aws", "아마존", "amazon"],
	&["클라우드", "cloud"],
	// Storage.
	&["데이터베이스", "database", "db", "디비"],
	&["포스트그레스", "postgresql", "postgres"],
	&["몽고", "mongodb", "mongo"],
	&["레디스", "redis", "캐시", "cache"],
	&["sql", "쿼리", "query"],
	&["jpa", "하이버네이트", "hibernate", "orm"],
	// Concepts.
	&["리팩토링", "refactoring", "리팩터링"],
	&["성능", "performance", "최적화", "optimization"],
	&["보안", "security", "시큐리티"],
	&["인증", "authentication", "auth", "로그인", "login"],
	&["인가", "authorization", "권한"],
	&["api", "에이피아이", "인터페이스", "interface"],
	&["rest", "restful", "레스트"],
	&["grpc", "지알피씨"],
	&["메시지큐", "message-queue", "mq", "카프카", "kafka", "래빗", "rabbitmq"],
	// Engineering.
	&["객체지향", "oop", "object-oriented"],
	&["함수형", "functional", "fp"],
	&["동시성", "concurrency", "병렬", "parallel"],
	&["비동기", "async", "asynchronous", "코루틴", "coroutine"],
	&["의존성주입", "dependency-injection", "di"],
	&["솔리드", "solid", "solid원칙"],
	&["클래스", "class"],
	&["상속", "inheritance"],
	&["다형성", "polymorphism"],
	&["캡슐화", "encapsulation"],
	// Data structures.
	&["알고리즘", "algorithm"],
	&["자료구조", "data-structure"],
	&["배열", "array", "리스트", "list"],
	&["해시", "hash", "해시맵", "hashmap", "맵", "map"],
	&["트리", "tree", "이진트리"],
	&["그래프", "graph"],
	// Web.
	&["프론트엔드", "frontend", "front-end", "프런트"],
	&["백엔드", "backend", "back-end", "서버", "server"],
	&["웹", "web"],
	&["모바일", "mobile", "앱", "app"],
	// Process.
	&["애자일", "agile"],
	&["스크럼", "scrum"],
	&["칸반", "kanban"],
	&["페어프로그래밍", "pair-programming", "페어"],
	&["코드리뷰", "code-review", "리뷰"],
	// Writing.
	&["문서", "document", "documentation", "문서화"],
	&["노트", "note", "메모", "memo"],
	&["마크다운", "markdown", "md"],
];

static TOKEN_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[가-힣a-zA-Z0-9]+").expect("Token pattern must compile."));
static KOREAN_PATTERN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[가-힣]").expect("Korean pattern must compile."));
static SYNONYM_LOOKUP: LazyLock<SynonymLookup> = LazyLock::new(SynonymLookup::build);

/// Term to group index. Keys keep first-insertion order; a term listed in several groups maps to
/// the last one.
struct SynonymLookup {
	entries: Vec<(String, usize)>,
	positions: HashMap<String, usize>,
}
impl SynonymLookup {
	fn build() -> Self {
		let mut entries = Vec::<(String, usize)>::new();
		let mut positions = HashMap::<String, usize>::new();

		for (group_idx, group) in SYNONYM_GROUPS.iter().enumerate() {
			for term in group.iter() {
				let key = term.to_lowercase();

				match positions.get(&key) {
					Some(&position) => entries[position].1 = group_idx,
					None => {
						positions.insert(key.clone(), entries.len());
						entries.push((key, group_idx));
					},
				}
			}
		}

		Self { entries, positions }
	}

	fn exact(&self, key: &str) -> Option<&'static [&'static str]> {
		self.positions.get(key).map(|position| SYNONYM_GROUPS[self.entries[*position].1])
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExpandedQuery {
	pub original_query: String,
	pub expanded_terms: Vec<String>,
	pub hyde_document: String,
	pub all_terms: Vec<String>,
}
impl ExpandedQuery {
	/// The original query followed by expanded terms, deduplicated, joined by single spaces.
	pub fn combined_query(&self) -> String {
		distinct(std::iter::once(self.original_query.clone()).chain(self.expanded_terms.clone()))
			.join(" ")
	}
}

/// Tokenizes `query`, collects synonyms of every token, and drafts a HyDE passage.
pub fn expand(query: &str) -> ExpandedQuery {
	let tokens = tokenize(query);
	let mut expanded = Vec::new();
	let mut seen = HashSet::new();

	for token in &tokens {
		for synonym in find_synonyms(token) {
			if seen.insert(synonym.clone()) {
				expanded.push(synonym);
			}
		}
	}

	let lowered = tokens.iter().map(|token| token.to_lowercase()).collect::<HashSet<_>>();

	expanded.retain(|term| !lowered.contains(term));

	let hyde_document = generate_hyde(query, &expanded);
	let all_terms = distinct(tokens.into_iter().chain(expanded.iter().cloned()));

	ExpandedQuery {
		original_query: query.to_string(),
		expanded_terms: expanded,
		hyde_document,
		all_terms,
	}
}

/// Maximal runs of Hangul syllables, ASCII letters, and digits, after NFC composition.
pub fn tokenize(query: &str) -> Vec<String> {
	let composed = query.nfc().collect::<String>();

	TOKEN_PATTERN.find_iter(&composed).map(|token| token.as_str().to_string()).collect()
}

/// Synonyms of `term`, excluding the term itself.
///
/// An exact table hit returns that group. Otherwise every group whose key contains the term, or
/// is contained in it, contributes, which lets short and compound spellings reach each other.
pub fn find_synonyms(term: &str) -> Vec<String> {
	let normalized = term.to_lowercase().trim().to_string();
	let lookup = &*SYNONYM_LOOKUP;

	if let Some(group) = lookup.exact(&normalized) {
		return group
			.iter()
			.filter(|synonym| **synonym != normalized)
			.map(|synonym| synonym.to_string())
			.collect();
	}

	let mut out = Vec::<String>::new();

	for (key, group_idx) in &lookup.entries {
		if !(key.contains(&normalized) || normalized.contains(key.as_str())) {
			continue;
		}

		for synonym in SYNONYM_GROUPS[*group_idx] {
			if *synonym != normalized && !out.iter().any(|existing| existing == synonym) {
				out.push(synonym.to_string());
			}
		}
	}

	out
}

pub fn has_synonym(term: &str) -> bool {
	let normalized = term.to_lowercase().trim().to_string();
	let lookup = &*SYNONYM_LOOKUP;

	lookup.positions.contains_key(&normalized)
		|| lookup
			.entries
			.iter()
			.any(|(key, _)| key.contains(&normalized) || normalized.contains(key.as_str()))
}

/// Hypothetical answer passage used as an auxiliary retrieval query.
///
/// The Korean template is used whenever the query contains a Hangul syllable.
pub fn generate_hyde(query: &str, synonyms: &[String]) -> String {
	let terms = distinct(std::iter::once(query.to_string()).chain(synonyms.iter().cloned()));
	let related = (terms.len() > 1).then(|| terms.join(", "));
	let mut doc = format!("# {query}\n\n");

	if KOREAN_PATTERN.is_match(query) {
		doc.push_str(&format!("이 문서는 {query} 에 대한 내용을 다룹니다.\n"));

		if let Some(related) = related {
			doc.push_str(&format!("관련 키워드: {related}\n"));
		}

		doc.push_str(&format!("{query} 의 주요 개념과 활용 방법을 설명합니다.\n"));
	} else {
		doc.push_str(&format!("This document covers the topic of {query}.\n"));

		if let Some(related) = related {
			doc.push_str(&format!("Related keywords: {related}\n"));
		}

		doc.push_str(&format!(
			"It explains the key concepts and practical applications of {query}.\n"
		));
	}

	doc.trim().to_string()
}

fn distinct(terms: impl IntoIterator<Item = String>) -> Vec<String> {
	let mut seen = HashSet::new();

	terms.into_iter().filter(|term| seen.insert(term.clone())).collect()
}
