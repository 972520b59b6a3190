use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use centime_core::AccountId;
use centime_import::ImportStats;

use crate::error::AppError;
use crate::ingest;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    pub account_id: i64,
}

/// Raw CSV payload in the request body; the configured bank profile
/// drives the parse.
pub async fn import_csv(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ImportQuery>,
    body: Bytes,
) -> Result<Json<ImportStats>, AppError> {
    let stats =
        ingest::run_import(&state.db, &state.profile, AccountId(params.account_id), &body).await?;
    Ok(Json(stats))
}
