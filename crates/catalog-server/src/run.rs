use crate::config::ServerConfig;
use crate::Result;
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::{response::IntoResponse, routing::get, Router};
use catalog_app::error::page_not_found;
use catalog_app::genre::genre_list_url;
use catalog_app::state::AppState;
use catalog_app::CATALOG_ROOT;
use futures::FutureExt;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

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
    debug!("Listening on {}", listener.local_addr()?);
    info!("Catalog available at {}", args.base_url.join(&genre_list_url())?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    Ok(())
}

fn main_router(state: AppState) -> Router<()> {
    Router::new()
        .nest(CATALOG_ROOT, catalog_app::genre::router())
        .fallback(page_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .route("/", get(root))
        .route("/health", get(health))
}

async fn root() -> Redirect {
    Redirect::to(&genre_list_url())
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let data_dir = config.data_dir();
    if !data_dir.is_dir() {
        tokio::fs::create_dir_all(&data_dir).await?;
        info!("Created data directory {}", data_dir.display());
    }

    let pool = catalog_dal::new_pool(&config.database_url()).await?;
    catalog_dal::migrate(&pool).await?;

    Ok(AppState::new(pool))
}
