use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use centime_core::Category;
use centime_storage as storage;

use crate::error::AppError;
use crate::AppState;

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(storage::get_all_categories(&state.db).await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryBody {
    pub name: String,
    #[serde(default)]
    pub parent_category: String,
    #[serde(default)]
    pub sub_category: String,
}

/// Inserts without checking for an identical (name, parent, sub) triple;
/// duplicate categories are an accepted outcome.
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateCategoryBody>,
) -> Result<Json<Category>, AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::Validation(
            "category name must not be empty".to_string(),
        ));
    }

    let category = storage::insert_category(
        &state.db,
        body.name.trim(),
        body.parent_category.trim(),
        body.sub_category.trim(),
    )
    .await?;

    Ok(Json(category))
}
