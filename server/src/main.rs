use anyhow::Result;
use axum::Router;
use clap::Parser;
use std::net::SocketAddr;
use tfidf_core::ConnectionProvider;
use tracing_subscriber::{fmt, EnvFilter};
use server::build_app;
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Storage directory
    #[arg(long, default_value = "./data")]
    db: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    // One storage connection for the whole process, opened before serving.
    let provider = ConnectionProvider::new(&args.db);
    let storage = provider.get()?;
    if let Some(meta) = storage.meta()? {
        tracing::info!(created_at = %meta.created_at, version = meta.version, "storage ready");
    }
    let app: Router = build_app(storage.clone())?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    storage.flush()?;
    Ok(())
}
