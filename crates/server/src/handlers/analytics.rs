use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use centime_core::{
    aggregate, CashflowBucket, CategoryIndex, CategoryTree, DateRange, Summary, Transaction,
    TransactionType,
};
use centime_storage as storage;

use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct TreeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub direction: String,
}

async fn load_range(
    state: &AppState,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(Vec<Transaction>, CategoryIndex), AppError> {
    if start > end {
        return Err(AppError::Validation(
            "start_date must not be after end_date".to_string(),
        ));
    }
    let transactions =
        storage::get_transactions_in_range(&state.db, DateRange::new(start, end), None).await?;
    let index = CategoryIndex::new(storage::get_all_categories(&state.db).await?);
    Ok((transactions, index))
}

/// One direction's parent → sub → transactions tree for the range.
pub async fn category_tree(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TreeQuery>,
) -> Result<Json<CategoryTree>, AppError> {
    let direction: TransactionType = params
        .direction
        .parse()
        .map_err(AppError::Validation)?;
    let (transactions, index) = load_range(&state, params.start_date, params.end_date).await?;
    Ok(Json(aggregate::build_tree(&transactions, &index, direction)))
}

pub async fn cashflow(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyticsQuery>,
) -> Result<Json<Vec<CashflowBucket>>, AppError> {
    let (transactions, index) = load_range(&state, params.start_date, params.end_date).await?;
    Ok(Json(aggregate::monthly_cashflow(&transactions, &index)))
}

pub async fn summary(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyticsQuery>,
) -> Result<Json<Summary>, AppError> {
    let (transactions, _) = load_range(&state, params.start_date, params.end_date).await?;
    Ok(Json(aggregate::summarize(&transactions)))
}
