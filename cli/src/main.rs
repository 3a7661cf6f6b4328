use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};
use tweetsearch_core::{build_index, load_corpus, IdfWeighting, InvertedIndex, Query, Ranker};

#[derive(Parser)]
#[command(name = "tweetsearch")]
#[command(about = "Inspect a tweet corpus and run TF-IDF queries against it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index and print corpus statistics
    Stats {
        /// Corpus file (.json / .jsonl) or directory
        #[arg(long)]
        corpus: PathBuf,
    },
    /// Rank the corpus against a query
    Query {
        /// Corpus file (.json / .jsonl) or directory
        #[arg(long)]
        corpus: PathBuf,
        /// Raw query text
        #[arg(long)]
        q: String,
        /// Number of results to print
        #[arg(long, default_value_t = 10)]
        k: usize,
        /// Idf formula: standard (ln(N/(1+df))) or smoothed (ln(1+N/(1+df)))
        #[arg(long, default_value_t = IdfWeighting::Standard)]
        idf: IdfWeighting,
        /// Print results as JSON lines
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Serialize)]
struct Hit<'a> {
    rank: usize,
    doc_id: &'a str,
    score: f64,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Stats { corpus } => {
            let index = open_index(&corpus)?;
            println!("documents:      {}", index.num_docs());
            println!("terms:          {}", index.num_terms());
            println!("avg length:     {:.2}", index.average_doc_length());
            println!("max length:     {}", index.max_doc_length());
            let empty = index.documents().filter(|(ord, _)| index.doc_length(*ord) == 0).count();
            println!("empty docs:     {empty}");
            Ok(())
        }
        Commands::Query { corpus, q, k, idf, json } => {
            let index = open_index(&corpus)?;
            run_query(&index, &q, k, idf, json)
        }
    }
}

fn open_index(corpus: &Path) -> Result<InvertedIndex> {
    let docs = load_corpus(corpus).with_context(|| format!("loading corpus from {}", corpus.display()))?;
    build_index(docs).context("building inverted index")
}

fn run_query(index: &InvertedIndex, raw: &str, k: usize, idf: IdfWeighting, json: bool) -> Result<()> {
    let query = Query::parse(raw);
    let ranker = Ranker::new(index).with_weighting(idf);
    let hits = ranker.search(&query);
    tracing::info!(query = raw, total_hits = hits.len(), %idf, "ranked");
    if hits.is_empty() && !json {
        println!("no results found");
        return Ok(());
    }
    for (i, (hit, doc_id)) in hits.iter().zip(ranker.ids(&hits)).take(k).enumerate() {
        if json {
            println!("{}", serde_json::to_string(&Hit { rank: i + 1, doc_id, score: hit.score })?);
        } else {
            println!("{:>3}. {doc_id}\t{:.6}", i + 1, hit.score);
        }
    }
    Ok(())
}
