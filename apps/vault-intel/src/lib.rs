use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use vault_config::Config;
use vault_domain::{
	expansion, relevance,
	tag::{self, TagRuleEngine},
};

#[derive(Debug, Parser)]
#[command(
	version = vault_cli::VERSION,
	rename_all = "kebab",
	styles = vault_cli::styles(),
)]
pub struct Args {
	/// Configuration file. Built-in defaults apply when omitted.
	#[arg(long, short = 'c', value_name = "FILE", global = true)]
	pub config: Option<PathBuf>,
	#[command(subcommand)]
	pub command: Command,
}

#[derive(Debug, Subcommand)]
#[command(rename_all = "kebab")]
pub enum Command {
	/// Normalize raw tags and report whether each result is valid.
	Normalize {
		#[arg(required = true)]
		tags: Vec<String>,
	},
	/// Group tags into their categories.
	Categorize {
		#[arg(required = true)]
		tags: Vec<String>,
	},
	/// Apply per-category caps and a global cap.
	Limit {
		/// Global cap. Defaults to `tagging.max_tags_per_document`.
		#[arg(long, value_name = "N")]
		max: Option<usize>,
		#[arg(required = true)]
		tags: Vec<String>,
	},
	/// Map concepts onto hierarchical tag paths.
	Hierarchy {
		#[arg(required = true)]
		concepts: Vec<String>,
	},
	/// Expand a query with synonyms and a hypothetical answer document.
	Expand { query: String },
	/// Lexical relevance of a document to keywords.
	Score {
		#[arg(long, default_value = "")]
		title: String,
		#[arg(long = "tag", value_name = "TAG")]
		tags: Vec<String>,
		#[arg(long, default_value = "")]
		content: String,
		#[arg(required = true)]
		keywords: Vec<String>,
	},
}

#[derive(Debug, Serialize)]
struct NormalizedTag {
	input: String,
	normalized: String,
	valid: bool,
}

#[derive(Debug, Serialize)]
struct HierarchyPath {
	concept: String,
	path: String,
}

#[derive(Debug, Serialize)]
struct RelevanceScore {
	keywords: Vec<String>,
	score: f64,
}

pub fn run(args: Args) -> color_eyre::Result<()> {
	let config = match &args.config {
		Some(path) => vault_config::load(path)?,
		None => Config::default(),
	};

	init_tracing(&config)?;

	let output = execute(&config, &args.command)?;

	println!("{}", serde_json::to_string_pretty(&output)?);

	Ok(())
}

/// Runs one command and returns its JSON output.
pub fn execute(config: &Config, command: &Command) -> color_eyre::Result<Value> {
	let engine = TagRuleEngine::from_config(&config.tagging);

	tracing::debug!(?command, "Running command.");

	let value = match command {
		Command::Normalize { tags } => {
			let normalized = tags
				.iter()
				.map(|input| {
					let normalized = engine.normalize(input);
					let valid = engine.validate(&normalized);

					NormalizedTag { input: input.clone(), normalized, valid }
				})
				.collect::<Vec<_>>();

			serde_json::to_value(normalized)?
		},
		Command::Categorize { tags } => serde_json::to_value(engine.categorize(tags))?,
		Command::Limit { max, tags } => {
			let max = max.unwrap_or(config.tagging.max_tags_per_document);

			serde_json::to_value(engine.limit_count(tags, max))?
		},
		Command::Hierarchy { concepts } => {
			let paths = concepts
				.iter()
				.map(|concept| HierarchyPath {
					concept: concept.clone(),
					path: tag::hierarchy_path(concept),
				})
				.collect::<Vec<_>>();

			serde_json::to_value(paths)?
		},
		Command::Expand { query } => serde_json::to_value(expansion::expand(query))?,
		Command::Score { title, tags, content, keywords } => serde_json::to_value(RelevanceScore {
			score: relevance::score(title, tags, content, keywords),
			keywords: keywords.clone(),
		})?,
	};

	Ok(value)
}

fn init_tracing(config: &Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

	Ok(())
}
