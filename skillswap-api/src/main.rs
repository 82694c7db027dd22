use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod cache_ops;
mod config;
mod models;
mod roll;
mod routes;
mod schema;

use config::AppConfig;
use skillswap_shared::cache::{ListCache, RedisListCache};
use skillswap_shared::clients::db::{create_pool, DbPool};

pub struct AppState {
    pub db: DbPool,
    pub config: AppConfig,
    pub cache: Arc<dyn ListCache>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    skillswap_shared::middleware::init_tracing("skillswap-api");

    let config = AppConfig::load()?;
    let port = config.port;

    let db = create_pool(&config.database_url);
    let cache: Arc<dyn ListCache> = Arc::new(RedisListCache::connect(&config.redis_url).await?);

    let state = Arc::new(AppState { db, config, cache });

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/users",
            post(routes::users::create_user).get(routes::users::get_user),
        )
        .route("/users/me", get(routes::users::get_me))
        .route(
            "/connections",
            post(routes::connections::create_connection).get(routes::connections::list_connections),
        )
        .route("/connections/:id", put(routes::connections::update_connection))
        .route(
            "/chats/:connection_id",
            get(routes::chats::list_messages).post(routes::chats::send_message),
        )
        .route(
            "/skills",
            post(routes::skills::create_skill).get(routes::skills::list_skills),
        )
        .route(
            "/sessions",
            post(routes::sessions::create_session).get(routes::sessions::list_sessions),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!(addr = %addr, "skillswap-api starting");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
