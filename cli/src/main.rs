use anyhow::{Context, Result};
use cinerank_core::{Document, IndexPaths, InvertedIndex, Tokenizer};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use tracing_subscriber::{fmt, EnvFilter};

/// Corpus file shape: {"movies": [{"id", "title", "description"}, ...]}.
#[derive(Debug, Deserialize)]
struct MovieFile {
    movies: Vec<Document>,
}

#[derive(Parser)]
#[command(name = "cinerank")]
#[command(about = "Build and query a BM25 movie index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the inverted index from a movie JSON file and persist it
    Build {
        /// Input movies JSON file
        #[arg(long)]
        input: String,
        /// Cache directory for the index snapshot
        #[arg(long, default_value = "./cache")]
        cache: String,
        /// Optional stopword file, one term per line
        #[arg(long)]
        stopwords: Option<String>,
    },
    /// Run a BM25 query against a persisted index
    Search {
        /// Free-text query
        #[arg(long)]
        query: String,
        /// Cache directory holding the index snapshot
        #[arg(long, default_value = "./cache")]
        cache: String,
        /// Maximum number of results
        #[arg(long, default_value_t = 5)]
        limit: usize,
        /// Optional stopword file, one term per line
        #[arg(long)]
        stopwords: Option<String>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            cache,
            stopwords,
        } => build(&input, &cache, stopwords.as_deref()),
        Commands::Search {
            query,
            cache,
            limit,
            stopwords,
        } => search(&query, &cache, limit, stopwords.as_deref()),
    }
}

fn tokenizer(stopwords: Option<&str>) -> Result<Tokenizer> {
    match stopwords {
        Some(path) => {
            Tokenizer::from_stopwords_file(path).with_context(|| format!("reading {path}"))
        }
        None => Ok(Tokenizer::new()),
    }
}

fn build(input: &str, cache: &str, stopwords: Option<&str>) -> Result<()> {
    let file = File::open(input).with_context(|| format!("opening {input}"))?;
    let corpus: MovieFile =
        serde_json::from_reader(BufReader::new(file)).with_context(|| format!("parsing {input}"))?;

    let mut index = InvertedIndex::new(tokenizer(stopwords)?);
    index.build(&corpus.movies)?;
    index.save(&IndexPaths::new(cache))?;
    tracing::info!(cache, num_docs = index.len(), "index build complete");
    Ok(())
}

fn search(query: &str, cache: &str, limit: usize, stopwords: Option<&str>) -> Result<()> {
    let index = InvertedIndex::load(&IndexPaths::new(cache), tokenizer(stopwords)?)?;
    let results = index.bm25_search(query, limit)?;
    if results.is_empty() {
        println!("no results for {query:?}");
        return Ok(());
    }
    for (rank, hit) in (1..).zip(results.iter()) {
        let title = index
            .doc(hit.doc_id)
            .map(|d| d.title.as_str())
            .unwrap_or("<unknown>");
        println!("{rank}. {title} (score {:.3})", hit.score);
    }
    Ok(())
}
