//! LentoFlow backend server library.

pub mod clock;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use lento_backend_config::AppConfig;
use lento_backend_domain::{HealthResponse, ReadyResponse};
use lento_backend_storage::{
    CompletionRepository, DailyLogRepository, TaskRepository, UserRepository, check_connection,
};
use sqlx::PgPool;

use clock::Clock;
use handlers::stats::{daily_stats, heatmap, monthly_stats, task_stats, weekly_stats};
use handlers::tasks::{create_task, delete_task, get_task, list_tasks, update_task};
use handlers::today::{complete_task, get_today_view, uncomplete_task};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub user_repo: UserRepository,
    pub task_repo: TaskRepository,
    pub completion_repo: CompletionRepository,
    pub daily_log_repo: DailyLogRepository,
    pub clock: Arc<dyn Clock>,
    pub config: AppConfig,
    pub start_time: Instant,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/ready", get(ready))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/me", get(handlers::auth::get_me))
        .route("/api/auth/settings", put(handlers::auth::update_settings))
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route(
            "/api/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/api/today", get(get_today_view))
        .route(
            "/api/today/complete/{task_id}",
            post(complete_task).delete(uncomplete_task),
        )
        .route("/api/stats/daily", get(daily_stats))
        .route("/api/stats/weekly", get(weekly_stats))
        .route("/api/stats/monthly", get(monthly_stats))
        .route("/api/stats/heatmap", get(heatmap))
        .route("/api/stats/task/{id}", get(task_stats))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let uptime = state.start_time.elapsed().as_secs();

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime,
    })
}

/// Readiness check endpoint.
async fn ready(State(state): State<Arc<AppState>>) -> Json<ReadyResponse> {
    let db_status = match check_connection(&state.pool).await {
        Ok(()) => "connected",
        Err(_) => "disconnected",
    };

    Json(ReadyResponse {
        status: if db_status == "connected" {
            "ok"
        } else {
            "degraded"
        }
        .to_string(),
        database: db_status.to_string(),
    })
}
