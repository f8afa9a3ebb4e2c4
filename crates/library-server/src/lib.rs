pub mod config;
pub mod error;
mod run;

use config::ServerConfig;
pub use error::{Error, Result};
use library_app::{menu::CATALOG_MENU, state::AppState};
pub use run::{main_router, run, run_graceful_with_state, run_with_state};
use tracing::info;

pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let data_dir = config.data_dir();
    if !data_dir.is_dir() {
        tokio::fs::create_dir_all(&data_dir).await?;
        info!("Created data directory {}", data_dir.display());
    }

    let pool = library_dal::new_pool(&config.database_url()).await?;
    library_dal::migrate(&pool).await?;
    Ok(AppState::new(pool, &CATALOG_MENU))
}

/// Installs the fmt subscriber, `RUST_LOG` overrides the default `info` level
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
