use centime_core::{CategorizationRule, CategoryId, MatchField};
use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite};

use super::db::DbPool;

type RuleRow = (i64, String, i64, String, i64, DateTime<Utc>);

fn map_rule(r: RuleRow) -> CategorizationRule {
    let match_field = match r.3.as_str() {
        "merchant" => MatchField::Merchant,
        _ => MatchField::Description,
    };
    CategorizationRule {
        id: r.0,
        keyword: r.1,
        category_id: CategoryId(r.2),
        match_field,
        is_active: r.4 != 0,
        created_at: r.5,
    }
}

/// All rules, oldest first — the engine's evaluation order.
pub async fn get_all_rules(pool: &DbPool) -> Result<Vec<CategorizationRule>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RuleRow>(
        "SELECT id, keyword, category_id, match_field, is_active, created_at \
         FROM categorization_rules ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(map_rule).collect())
}

pub async fn get_active_rules<'e, E>(ex: E) -> Result<Vec<CategorizationRule>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, RuleRow>(
        "SELECT id, keyword, category_id, match_field, is_active, created_at \
         FROM categorization_rules WHERE is_active = 1 ORDER BY created_at, id",
    )
    .fetch_all(ex)
    .await?;

    Ok(rows.into_iter().map(map_rule).collect())
}

pub async fn insert_rule<'e, E>(
    ex: E,
    keyword: &str,
    category_id: CategoryId,
    match_field: MatchField,
) -> Result<CategorizationRule, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let created_at = Utc::now();
    let result = sqlx::query(
        "INSERT INTO categorization_rules (keyword, category_id, match_field, is_active, created_at) \
         VALUES (?, ?, ?, 1, ?)",
    )
    .bind(keyword)
    .bind(category_id.0)
    .bind(match_field.as_str())
    .bind(created_at)
    .execute(ex)
    .await?;

    Ok(CategorizationRule {
        id: result.last_insert_rowid(),
        keyword: keyword.to_string(),
        category_id,
        match_field,
        is_active: true,
        created_at,
    })
}
