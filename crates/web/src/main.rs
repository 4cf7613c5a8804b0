use std::sync::Arc;

use directions::{GoogleDirections, RouteEstimate, RouteSource};
use taskqueue::{Dispatcher, TaskStore};
use web::{start_web_server, AppState, Config};

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = Config::from_env().expect("expected a complete configuration in env.");

    // directions client with the configured cache behind it
    let route_cache = cache::connect::<RouteEstimate>(&config.cache)
        .await
        .expect("could not initialize the directions cache.");
    let directions: Arc<dyn RouteSource> = Arc::new(GoogleDirections::new(
        config.google_api_token.clone(),
        route_cache,
    ));

    // task queue
    let store = TaskStore::connect(&config.task.uri, &config.task.table, config.task.ttl_ms)
        .await
        .expect("could not connect to the task store.");

    // dispatcher
    let defaults = config.defaults;
    Dispatcher::new(store.clone(), directions.clone(), defaults, config.processor).spawn();

    // web server
    log::info!("listening on 0.0.0.0:{}", config.port);
    let state = AppState {
        config: Arc::new(config),
        directions,
        store,
        defaults,
    };
    let _ = start_web_server(state).await;
}
