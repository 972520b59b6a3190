pub mod config;
pub mod error;
pub mod handlers;
pub mod ingest;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use centime_import::BankProfile;
use centime_storage::DbPool;

pub use config::Config;
pub use error::AppError;

/// Bank exports run long; the default 2 MB body cap is too tight for a
/// year of statements.
const MAX_IMPORT_BYTES: usize = 16 * 1024 * 1024;

pub struct AppState {
    pub db: DbPool,
    pub profile: BankProfile,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Centime API", "status": "running" }))
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/transactions", get(handlers::transactions::list_transactions))
        .route(
            "/transactions/{id}/category",
            patch(handlers::transactions::set_category),
        )
        .route(
            "/transactions/{id}/recategorize",
            post(handlers::transactions::recategorize),
        )
        .route(
            "/categories",
            get(handlers::categories::list_categories).post(handlers::categories::create_category),
        )
        .route("/accounts", get(handlers::accounts::list_accounts))
        .route("/import", post(handlers::import::import_csv))
        .route(
            "/rules",
            get(handlers::rules::list_rules).post(handlers::rules::create_rule),
        )
        .route("/rules/apply", post(handlers::rules::reapply_rules))
        .route("/analytics/tree", get(handlers::analytics::category_tree))
        .route("/analytics/cashflow", get(handlers::analytics::cashflow))
        .route("/analytics/summary", get(handlers::analytics::summary))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(MAX_IMPORT_BYTES))
        .with_state(state)
}
