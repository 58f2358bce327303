use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use news_reader::config::Config;
use news_reader::db::Database;

/// Read-only web frontend for crawled news articles
#[derive(Parser, Debug)]
#[command(name = "news-reader")]
#[command(version)]
struct Args {
    /// TOML configuration file; built-in defaults apply without one
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// URL prefix all routes are served under
    #[arg(long)]
    prefix: Option<String>,

    /// Bind address (host:port)
    #[arg(short, long)]
    address: Option<String>,

    /// Static files directory
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// Path to the SQLite database
    #[arg(short, long, env = "DATABASE_PATH")]
    database: Option<PathBuf>,

    /// Number of articles on the front page
    #[arg(short, long)]
    items: Option<usize>,
}

impl Args {
    fn into_config(self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };

        if let Some(prefix) = self.prefix {
            config.prefix = prefix;
        }
        if let Some(address) = self.address {
            config.address = address;
        }
        if let Some(static_dir) = self.static_dir {
            config.static_dir = static_dir;
        }
        if let Some(database) = self.database {
            config.database = database;
        }
        if let Some(items) = self.items {
            config.items = items;
        }

        config.validate()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "news_reader=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Args::parse().into_config()?;
    info!("URL prefix: {:?}", config.prefix);
    info!("Database path: {}", config.database.display());
    info!("Front page items: {}", config.items);

    // Both queries are prepared before accepting connections
    let db = Database::open(&config.database).await?;
    db.prepare_queries().await?;
    info!("Database opened read-only");

    let app = news_reader::app(&config, db);

    let listener = tokio::net::TcpListener::bind(&config.address).await?;
    info!("Server starting on http://{}{}/", config.address, config.prefix);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
