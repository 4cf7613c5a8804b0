use std::sync::Arc;

use directions::RouteSource;
use scheduler::SchedulingDefaults;
use taskqueue::TaskStore;
use tokio::net::TcpListener;

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;

pub use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub directions: Arc<dyn RouteSource>,
    pub store: TaskStore,
    pub defaults: SchedulingDefaults,
}

pub async fn start_web_server(state: AppState) -> std::io::Result<()> {
    let port = state.config.port;
    let routes = routes::routes(state);

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    axum::serve(listener, routes.into_make_service()).await?;

    Ok(())
}
