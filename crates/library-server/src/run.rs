use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect},
    routing::get,
    Router,
};
use futures::FutureExt;
use library_app::{error::ApiError, state::AppState};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{build_state, config::ServerConfig, error::Result};

pub async fn run(args: ServerConfig) -> Result<()> {
    let state = build_state(&args).await?;
    run_with_state(args, state).await
}

pub async fn run_with_state(args: ServerConfig, state: AppState) -> Result<()> {
    let shutdown = tokio::signal::ctrl_c().map(|_| ());
    run_graceful_with_state(args, state, shutdown).await
}

pub async fn run_graceful_with_state<S>(
    args: ServerConfig,
    state: AppState,
    shutdown_signal: S,
) -> Result<()>
where
    S: std::future::Future<Output = ()> + Send + 'static,
{
    let app = main_router(state);

    let ip: std::net::IpAddr = args.listen_address.parse()?;
    let addr = std::net::SocketAddr::from((ip, args.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        "Listening on {}, public URL {}",
        listener.local_addr()?,
        args.base_url
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server stopped");
    Ok(())
}

pub fn main_router(state: AppState) -> Router<()> {
    Router::new()
        .nest("/catalog", library_app::catalog::router())
        .route("/", get(root))
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn root() -> Redirect {
    Redirect::to("/catalog")
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Page not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use clap::Parser as _;
    use tower::ServiceExt as _;

    async fn test_router(dir: &tempfile::TempDir) -> Router {
        let data_dir = dir.path().to_string_lossy().to_string();
        let config =
            ServerConfig::try_parse_from(["library-server", "--data-dir", data_dir.as_str()])
                .unwrap();
        let state = build_state(&config).await.unwrap();
        main_router(state)
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(&dir).await;

        let response = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(StatusCode::SEE_OTHER, response.status());
        assert_eq!("/catalog", response.headers()["location"]);

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(StatusCode::OK, response.status());
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(&dir).await;
        let response = app
            .oneshot(Request::get("/no/such/page").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(StatusCode::NOT_FOUND, response.status());
    }
}
