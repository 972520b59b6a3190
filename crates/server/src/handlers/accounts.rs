use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use centime_core::Account;
use centime_storage as storage;

use crate::error::AppError;
use crate::AppState;

pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Account>>, AppError> {
    Ok(Json(storage::get_all_accounts(&state.db).await?))
}
