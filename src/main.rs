#[cfg(feature = "server")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use pigmix::config::AppConfig;
    use pigmix::db::{self, SqliteCatalog};
    use pigmix::logging::{init_logging, LoggingConfig};
    use pigmix::state::AppState;
    use pigmix::{KubelkaMunkTransform, MixSearchEngine};

    // Load config (also reads .env)
    let config = AppConfig::from_env()?;
    init_logging(LoggingConfig::default());

    // Initialize database
    let pool = db::create_pool(&config.database_url, config.max_connections).await?;
    db::run_migrations(&pool).await?;
    if config.seed_catalog {
        db::seed_default_catalog(&pool).await?;
    }

    // Create app state
    let engine = MixSearchEngine::new(KubelkaMunkTransform::new()).with_ratio_grid(config.ratio_grid);
    log::info!("mix search using {} ratio grid", config.ratio_grid.as_str());
    let state = AppState::new(SqliteCatalog::new(pool), engine);

    let app = pigmix::api::router(state, config.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    log::info!("listening on http://{}", config.bind_addr);
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

#[cfg(not(feature = "server"))]
fn main() {
    eprintln!("pigmix was built without the `server` feature");
}
