use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use centime_core::{CategorizationRule, CategoryId, MatchField};
use centime_import::RuleEngine;
use centime_storage as storage;

use crate::error::AppError;
use crate::AppState;

pub async fn list_rules(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CategorizationRule>>, AppError> {
    Ok(Json(storage::get_all_rules(&state.db).await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateRuleBody {
    pub keyword: String,
    pub category_id: i64,
    #[serde(default = "default_match_field")]
    pub match_field: String,
}

fn default_match_field() -> String {
    "description".to_string()
}

pub async fn create_rule(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateRuleBody>,
) -> Result<Json<CategorizationRule>, AppError> {
    CategorizationRule::validate_keyword(&body.keyword)?;
    let match_field: MatchField = body.match_field.parse()?;

    let category_id = CategoryId(body.category_id);
    if storage::get_category(&state.db, category_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "category {category_id} not found"
        )));
    }

    let rule =
        storage::insert_rule(&state.db, body.keyword.trim(), category_id, match_field).await?;
    Ok(Json(rule))
}

#[derive(Debug, Serialize)]
pub struct ReapplyResponse {
    pub updated: u64,
}

/// Bulk-reapply: runs the engine over every stored transaction that still
/// has no category. Manual assignments are never revisited.
pub async fn reapply_rules(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReapplyResponse>, AppError> {
    let mut dbtx = state.db.begin().await?;

    let engine = RuleEngine::new(storage::get_active_rules(&mut *dbtx).await?);
    let mut updated = 0;

    if !engine.is_empty() {
        let uncategorized = storage::get_uncategorized_transactions(&mut *dbtx).await?;
        for tx in &uncategorized {
            if let Some(category) = engine.categorize(&tx.description, tx.merchant.as_deref()) {
                updated += storage::set_transaction_category(&mut *dbtx, tx.id, category).await?;
            }
        }
    }

    dbtx.commit().await?;

    tracing::info!(updated, "rules reapplied to uncategorized transactions");
    Ok(Json(ReapplyResponse { updated }))
}
