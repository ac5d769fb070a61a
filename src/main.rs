use std::sync::Arc;
use tag_admin::config::AppConfig;
use tag_admin::store::{MemoryStore, PostgresStore, TagStore};
use tag_admin::{build_app, run_server, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    use env_logger::Builder;
    use log::LevelFilter;

    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter_module("sqlx", LevelFilter::Warn)
        .parse_default_env()
        .init();

    let config = AppConfig::load()?;
    log::info!(
        "Configuration loaded: server={}:{}",
        config.server.host,
        config.server.port
    );

    match config.database_url() {
        Some(database_url) => {
            log::info!("Connecting to PostgreSQL...");
            let store = PostgresStore::new(&database_url, config.max_connections()).await?;
            store.migrate().await?;
            serve(Arc::new(store), &config).await
        }
        None => {
            log::warn!("No database configured, using the in-memory store");
            serve(Arc::new(MemoryStore::new()), &config).await
        }
    }
}

async fn serve<S: TagStore + 'static>(store: Arc<S>, config: &AppConfig) -> anyhow::Result<()> {
    if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
        log::info!("Loading seed data...");
        seed::load_seed_data(&*store).await?;
    }

    run_server(build_app(store, config), config).await
}
