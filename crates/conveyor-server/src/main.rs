use clap::Parser;
use conveyor_ingest::create_sink;
use conveyor_server::{config::AppConfig, create_router, AppState};
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "conveyor-server", version, about = "Conveyor HTTP server")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, short, default_value = "conveyor.yaml")]
    config: PathBuf,

    /// Override the bind address from configuration.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::load(&cli.config)?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    conveyor_schema::bootstrap::ensure_registry(&pool).await?;

    let sink = create_sink(config.sink.backend, pool.clone());
    let state = AppState::new(pool, sink);
    let app = create_router(state);

    tracing::info!("conveyor-server listening on {}", config.server.bind);
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
