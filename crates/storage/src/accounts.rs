use centime_core::{Account, AccountId, Money};

use super::db::DbPool;

fn map_account(r: (i64, String, Option<String>, i64, i64)) -> Account {
    Account {
        id: AccountId(r.0),
        name: r.1,
        account_type: r.2,
        balance: Money::from_cents(r.3),
        is_active: r.4 != 0,
    }
}

pub async fn get_all_accounts(pool: &DbPool) -> Result<Vec<Account>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, String, Option<String>, i64, i64)>(
        "SELECT id, name, account_type, balance_cents, is_active
         FROM accounts WHERE is_active = 1 ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(map_account).collect())
}

pub async fn get_account(pool: &DbPool, id: AccountId) -> Result<Option<Account>, sqlx::Error> {
    let row = sqlx::query_as::<_, (i64, String, Option<String>, i64, i64)>(
        "SELECT id, name, account_type, balance_cents, is_active
         FROM accounts WHERE id = ?",
    )
    .bind(id.0)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(map_account))
}
