use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use centime_core::{
    AccountId, CategorizationRule, Category, CategoryId, CategoryIndex, DateRange, MatchField,
    Transaction,
};
use centime_storage as storage;

use crate::error::AppError;
use crate::AppState;

/// A transaction with its category labels resolved for display.
#[derive(Debug, Serialize)]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub category_name: Option<String>,
    pub parent_category: Option<String>,
    pub sub_category: Option<String>,
}

impl TransactionView {
    pub fn new(transaction: Transaction, index: &CategoryIndex) -> Self {
        let category = transaction.category_id.and_then(|id| index.get(id));
        let (category_name, parent_category, sub_category) = match category {
            Some(cat) => (
                Some(cat.name.clone()),
                Some(cat.parent_category.clone()),
                Some(cat.sub_category.clone()),
            ),
            None => (None, None, None),
        };
        Self {
            transaction,
            category_name,
            parent_category,
            sub_category,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub account_id: Option<i64>,
}

impl RangeQuery {
    pub fn range(&self) -> Result<DateRange, AppError> {
        if self.start_date > self.end_date {
            return Err(AppError::Validation(
                "start_date must not be after end_date".to_string(),
            ));
        }
        Ok(DateRange::new(self.start_date, self.end_date))
    }
}

pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RangeQuery>,
) -> Result<Json<Vec<TransactionView>>, AppError> {
    let range = params.range()?;
    let account_id = params.account_id.map(AccountId);

    let transactions = storage::get_transactions_in_range(&state.db, range, account_id).await?;
    let index = CategoryIndex::new(storage::get_all_categories(&state.db).await?);

    Ok(Json(
        transactions
            .into_iter()
            .map(|t| TransactionView::new(t, &index))
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct SetCategoryBody {
    pub category_id: i64,
}

pub async fn set_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<SetCategoryBody>,
) -> Result<Json<TransactionView>, AppError> {
    let category_id = CategoryId(body.category_id);
    if storage::get_category(&state.db, category_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "category {category_id} not found"
        )));
    }

    let updated = storage::set_transaction_category(&state.db, id, category_id).await?;
    if updated == 0 {
        return Err(AppError::NotFound(format!("transaction {id} not found")));
    }

    load_view(&state, id).await
}

#[derive(Debug, Deserialize)]
pub struct NewCategoryBody {
    pub name: String,
    #[serde(default)]
    pub parent_category: String,
    #[serde(default)]
    pub sub_category: String,
}

#[derive(Debug, Deserialize)]
pub struct NewRuleBody {
    pub keyword: String,
    #[serde(default = "default_match_field")]
    pub match_field: String,
}

fn default_match_field() -> String {
    "description".to_string()
}

#[derive(Debug, Deserialize)]
pub struct RecategorizeBody {
    pub category_id: Option<i64>,
    pub new_category: Option<NewCategoryBody>,
    pub rule: Option<NewRuleBody>,
}

#[derive(Debug, Serialize)]
pub struct RecategorizeResponse {
    pub transaction: TransactionView,
    pub created_category: Option<Category>,
    pub created_rule: Option<CategorizationRule>,
}

/// One transactional unit: optionally create a category, assign it to the
/// transaction, and optionally derive a rule. Category creation and the
/// assignment commit or roll back together; the rule is best-effort after
/// the commit and never fails the operation.
pub async fn recategorize(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<RecategorizeBody>,
) -> Result<Json<RecategorizeResponse>, AppError> {
    let mut dbtx = state.db.begin().await?;

    let (category, created_category) = match (&body.new_category, body.category_id) {
        (Some(new_cat), _) => {
            if new_cat.name.trim().is_empty() {
                return Err(AppError::Validation(
                    "category name must not be empty".to_string(),
                ));
            }
            let cat = storage::insert_category(
                &mut *dbtx,
                new_cat.name.trim(),
                new_cat.parent_category.trim(),
                new_cat.sub_category.trim(),
            )
            .await?;
            (cat.clone(), Some(cat))
        }
        (None, Some(category_id)) => {
            let cat = storage::get_category(&mut *dbtx, CategoryId(category_id))
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("category {category_id} not found"))
                })?;
            (cat, None)
        }
        (None, None) => {
            return Err(AppError::Validation(
                "either category_id or new_category is required".to_string(),
            ));
        }
    };

    let updated = storage::set_transaction_category(&mut *dbtx, id, category.id).await?;
    if updated == 0 {
        // Dropping the transaction rolls the fresh category back too.
        return Err(AppError::NotFound(format!("transaction {id} not found")));
    }

    dbtx.commit().await?;

    let created_rule = match &body.rule {
        Some(rule) => create_rule_best_effort(&state, rule, category.id).await,
        None => None,
    };

    let transaction = load_view(&state, id).await?;
    Ok(Json(RecategorizeResponse {
        transaction: transaction.0,
        created_category,
        created_rule,
    }))
}

async fn create_rule_best_effort(
    state: &AppState,
    rule: &NewRuleBody,
    category_id: CategoryId,
) -> Option<CategorizationRule> {
    if CategorizationRule::validate_keyword(&rule.keyword).is_err() {
        tracing::warn!("skipping rule creation: empty keyword");
        return None;
    }
    let match_field = match rule.match_field.parse::<MatchField>() {
        Ok(field) => field,
        Err(e) => {
            tracing::warn!("skipping rule creation: {e}");
            return None;
        }
    };
    match storage::insert_rule(&state.db, rule.keyword.trim(), category_id, match_field).await {
        Ok(created) => Some(created),
        Err(e) => {
            tracing::warn!("rule creation failed after recategorization: {e}");
            None
        }
    }
}

async fn load_view(state: &AppState, id: i64) -> Result<Json<TransactionView>, AppError> {
    let transaction = storage::get_transaction(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("transaction {id} not found")))?;
    let index = CategoryIndex::new(storage::get_all_categories(&state.db).await?);
    Ok(Json(TransactionView::new(transaction, &index)))
}
