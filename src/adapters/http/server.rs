//! Router assembly and server startup.

use std::sync::Arc;

use anyhow::Result;
use axum::routing::{get, post, put};
use axum::Router;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::adapters::http::{labels, meetings, relationships, thoughts, topics};
use crate::adapters::sqlite::{
    SqliteLabelRepository, SqliteMeetingRepository, SqliteRelationshipRepository,
    SqliteThoughtRepository, SqliteTopicRepository, SqliteUserRepository,
};
use crate::domain::models::ServerConfig;
use crate::domain::ports::{LabelRepository, RelationshipRepository, UserRepository};
use crate::services::{MeetingService, PromotionService, TopicService};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub relationships: Arc<dyn RelationshipRepository>,
    pub labels: Arc<dyn LabelRepository>,
    pub topics: Arc<TopicService>,
    pub meetings: Arc<MeetingService>,
    pub promotions: Arc<PromotionService>,
}

impl AppState {
    /// Wire repositories and services over a connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        let users = Arc::new(SqliteUserRepository::new(pool.clone()));
        let relationships = Arc::new(SqliteRelationshipRepository::new(pool.clone()));
        let labels = Arc::new(SqliteLabelRepository::new(pool.clone()));
        let topic_repo = Arc::new(SqliteTopicRepository::new(pool.clone()));
        let thought_repo = Arc::new(SqliteThoughtRepository::new(pool.clone()));
        let meeting_repo = Arc::new(SqliteMeetingRepository::new(pool));

        Self {
            users,
            relationships: relationships.clone(),
            labels: labels.clone(),
            topics: Arc::new(TopicService::new(
                topic_repo.clone(),
                relationships.clone(),
                labels.clone(),
            )),
            meetings: Arc::new(MeetingService::new(
                meeting_repo,
                topic_repo.clone(),
                relationships,
            )),
            promotions: Arc::new(PromotionService::new(thought_repo, topic_repo, labels)),
        }
    }
}

/// Build the application router.
pub fn build_router(state: AppState, enable_cors: bool) -> Router {
    let app = Router::new()
        // Topics
        .route("/topics", get(topics::list).post(topics::create))
        .route(
            "/topics/{id}",
            get(topics::detail).put(topics::update).delete(topics::remove),
        )
        .route("/topics/{id}/archive", post(topics::archive))
        .route("/topics/{id}/reorder", put(topics::reorder))
        // Meetings
        .route("/meetings", get(meetings::list).post(meetings::create))
        .route("/meetings/generate", post(meetings::generate))
        .route(
            "/meetings/{id}",
            get(meetings::detail)
                .put(meetings::update)
                .delete(meetings::cancel),
        )
        .route("/meetings/{id}/complete", post(meetings::complete))
        .route("/meetings/{id}/topics", post(meetings::attach_topic))
        .route(
            "/meetings/{id}/topics/{topic_id}",
            put(meetings::update_agenda_entry).delete(meetings::detach_topic),
        )
        .route(
            "/meetings/{id}/notes",
            get(meetings::get_notes).put(meetings::update_notes),
        )
        // Thoughts
        .route("/thoughts", get(thoughts::list).post(thoughts::create))
        .route(
            "/thoughts/{id}",
            get(thoughts::detail)
                .put(thoughts::update)
                .delete(thoughts::remove),
        )
        .route("/thoughts/{id}/promote", post(thoughts::promote))
        // Shared reference data
        .route("/labels", get(labels::list))
        .route("/relationships", get(relationships::list))
        // Health check
        .route("/health", get(health_check))
        .with_state(state);

    if enable_cors {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
    } else {
        app.layer(TraceLayer::new_for_http())
    }
}

async fn health_check() -> &'static str {
    "OK"
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let router = build_router(state, config.enable_cors);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(listener, router).await?;
    Ok(())
}

/// Serve with a shutdown signal, used by tests and supervised deployments.
pub async fn serve_with_shutdown<F>(config: &ServerConfig, state: AppState, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let addr = format!("{}:{}", config.host, config.port);
    let router = build_router(state, config.enable_cors);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
