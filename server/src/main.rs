use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};
use tweetsearch_core::IdfWeighting;
use tweetsearch_server::events::{EventSink, JsonlEventSink, MemoryEventLog};
use tweetsearch_server::{build_app, AppState};

#[derive(Parser)]
#[command(name = "tweetsearch-server", about = "Serve TF-IDF search over a tweet corpus")]
struct Args {
    /// Corpus file (.json / .jsonl) or directory of them
    #[arg(long, default_value = "./processed_tweets.json")]
    corpus: PathBuf,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8088)]
    port: u16,
    /// Idf formula for query weights: standard or smoothed
    #[arg(long, default_value_t = IdfWeighting::Standard)]
    idf: IdfWeighting,
    /// Append query and click events to this JSON lines file instead of memory
    #[arg(long)]
    events_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let events: Arc<dyn EventSink> = match &args.events_file {
        Some(path) => {
            tracing::info!(path = %path.display(), "recording events to file");
            Arc::new(JsonlEventSink::open(path)?)
        }
        None => Arc::new(MemoryEventLog::new()),
    };
    let state = AppState::load(&args.corpus, args.idf, events)?;
    tracing::info!(num_docs = state.index.num_docs(), idf = %args.idf, "index ready");
    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
