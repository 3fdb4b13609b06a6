use clap::{Parser, Subcommand};
use miao_knowledge::{
    BackendKind, KnowledgeBase, ScoredEntry, SearchConfig, build_backend, decide, loader,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// A CLI tool to query and inspect miao knowledge bases.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Knowledge base file (.json or .toml); the built-in sample is used when omitted
    #[arg(short, long)]
    kb: Option<PathBuf>,

    /// Search configuration file (.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Find the best knowledge entry for a question
    Search {
        /// The question to match
        query: String,
        /// Minimum score for a match (inclusive)
        #[arg(short, long)]
        threshold: Option<f64>,
        /// Number of candidates to show
        #[arg(long)]
        top_k: Option<usize>,
        /// Search backend: lexical, remote or semantic
        #[arg(short, long)]
        backend: Option<BackendKind>,
        /// Base URL of the remote knowledge service
        #[arg(long)]
        remote_url: Option<String>,
        /// Text corpus to index alongside the knowledge base (semantic backend)
        #[arg(long)]
        corpus: Option<PathBuf>,
        /// Output format
        #[arg(short, long, default_value = "summary")]
        format: OutputFormat,
    },
    /// Validate a knowledge base file and report dropped entries
    Validate {
        /// Output format
        #[arg(short, long, default_value = "summary")]
        format: OutputFormat,
    },
    /// Show knowledge base statistics
    Stats {
        /// Output format
        #[arg(short, long, default_value = "summary")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum OutputFormat {
    Summary,
    Full,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "summary" => Ok(OutputFormat::Summary),
            "full" => Ok(OutputFormat::Full),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid format: {s}")),
        }
    }
}

#[derive(Serialize)]
struct SearchOutput {
    query: String,
    backend: String,
    threshold: f64,
    accepted: bool,
    best: Option<miao_knowledge::KnowledgeMatch>,
    candidates: Vec<ScoredEntry>,
}

#[derive(Serialize)]
struct CategoryStats {
    name: String,
    keywords: usize,
    subcategories: usize,
    entries: usize,
}

#[derive(Serialize)]
struct KnowledgeStats {
    mode: &'static str,
    total_entries: usize,
    categories: Vec<CategoryStats>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn load_knowledge_base(path: Option<&Path>) -> KnowledgeBase {
    match path {
        Some(path) => loader::load_or_empty(path),
        None => KnowledgeBase::sample(),
    }
}

async fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SearchConfig::from_toml_file(path)?,
        None => SearchConfig::default(),
    };
    if let Some(kb) = &args.kb {
        config = config.with_knowledge_path(kb.clone());
    }

    match args.command {
        Commands::Search {
            query,
            threshold,
            top_k,
            backend,
            remote_url,
            corpus,
            format,
        } => {
            if let Some(threshold) = threshold {
                config = config.with_threshold(threshold);
            }
            if let Some(top_k) = top_k {
                config = config.with_top_k(top_k);
            }
            if let Some(backend) = backend {
                config = config.with_backend(backend);
            }
            if let Some(url) = remote_url {
                config = config.with_remote_url(url);
            }
            if let Some(corpus) = corpus {
                config = config.with_corpus_path(corpus);
            }

            let kb = Arc::new(load_knowledge_base(config.knowledge_path.as_deref()));
            let backend = build_backend(&config, kb).await?;

            // Backend failures mean "no match", same as in the chat pipeline.
            let candidates = backend
                .search(&query, config.top_k)
                .await
                .unwrap_or_else(|e| {
                    tracing::warn!("{} knowledge search failed: {}", backend.backend_name(), e);
                    Vec::new()
                });
            let best = decide(candidates.first().cloned(), config.threshold);

            let output = SearchOutput {
                query,
                backend: backend.backend_name().to_string(),
                threshold: config.threshold,
                accepted: best.is_some(),
                best,
                candidates,
            };

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&output)?);
                }
                OutputFormat::Summary => match &output.best {
                    Some(matched) => {
                        println!("Match ({} backend):", output.backend);
                        println!("  Question: {}", matched.question);
                        println!("  Answer: {}", matched.answer);
                        println!(
                            "  Tags: {}",
                            matched.tags.iter().cloned().collect::<Vec<_>>().join(", ")
                        );
                    }
                    None => {
                        println!(
                            "No match at threshold {:.2} (best score: {})",
                            output.threshold,
                            output
                                .candidates
                                .first()
                                .map(|c| format!("{:.3}", c.score))
                                .unwrap_or_else(|| "none".to_string())
                        );
                    }
                },
                OutputFormat::Full => {
                    println!("Query: {}", output.query);
                    println!("Backend: {}", output.backend);
                    println!("Threshold: {:.2}", output.threshold);
                    println!("Accepted: {}", if output.accepted { "Yes" } else { "No" });
                    println!("Candidates:");
                    for (rank, candidate) in output.candidates.iter().enumerate() {
                        println!(
                            "  {}. [{:.3}] {}",
                            rank + 1,
                            candidate.score,
                            candidate.question
                        );
                        println!(
                            "     Tags: {}",
                            candidate.tags.iter().cloned().collect::<Vec<_>>().join(", ")
                        );
                        println!(
                            "     Answer: {}",
                            candidate.answer.chars().take(100).collect::<String>()
                        );
                    }
                }
            }
            Ok(())
        }
        Commands::Validate { format } => {
            let path = config
                .knowledge_path
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("validate requires --kb <FILE>"))?;
            let (kb, report) = loader::load(path)?;

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                OutputFormat::Summary | OutputFormat::Full => {
                    println!("Knowledge base {} is valid", path.display());
                    println!(
                        "  Mode: {}",
                        if kb.is_hierarchical() { "hierarchical" } else { "flat" }
                    );
                    println!("  Categories: {}", report.categories);
                    println!("  Subcategories: {}", report.subcategories);
                    println!("  Entries: {}", report.entries);
                    println!("  Dropped entries: {}", report.dropped_entries);
                    println!("  Dropped keywords: {}", report.dropped_keywords);
                }
            }
            Ok(())
        }
        Commands::Stats { format } => {
            let kb = load_knowledge_base(config.knowledge_path.as_deref());
            let stats = KnowledgeStats {
                mode: if kb.is_hierarchical() { "hierarchical" } else { "flat" },
                total_entries: kb.entry_count(),
                categories: kb
                    .categories()
                    .iter()
                    .map(|c| CategoryStats {
                        name: c.name.clone(),
                        keywords: c.keywords.len(),
                        subcategories: c.subcategories.len(),
                        entries: c.entry_count(),
                    })
                    .collect(),
            };

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&stats)?);
                }
                OutputFormat::Summary | OutputFormat::Full => {
                    println!("Knowledge Base Statistics:");
                    println!("  Mode: {}", stats.mode);
                    println!("  Total entries: {}", stats.total_entries);
                    println!("  Categories: {}", stats.categories.len());
                    for category in &stats.categories {
                        println!(
                            "    {} ({} subcategories, {} entries, {} keywords)",
                            category.name,
                            category.subcategories,
                            category.entries,
                            category.keywords
                        );
                    }
                }
            }
            Ok(())
        }
    }
}
