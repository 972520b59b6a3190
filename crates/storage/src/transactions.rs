use centime_core::{AccountId, CategoryId, DateRange, Money, Transaction, TransactionType};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Executor, Sqlite};

use super::db::DbPool;

/// Insert payload; id and creation timestamp are assigned here.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: AccountId,
    pub category_id: Option<CategoryId>,
    pub transaction_type: TransactionType,
    pub amount: Money,
    pub description: String,
    pub merchant: Option<String>,
    pub category_parent_csv: Option<String>,
    pub date: NaiveDate,
    pub import_batch: Option<String>,
}

type TransactionRow = (
    i64,
    i64,
    Option<i64>,
    String,
    i64,
    String,
    Option<String>,
    Option<String>,
    NaiveDate,
    Option<String>,
    DateTime<Utc>,
);

const TRANSACTION_COLUMNS: &str = "id, account_id, category_id, transaction_type, amount_cents, \
     description, merchant, category_parent_csv, date, import_batch, created_at";

fn map_transaction(r: TransactionRow) -> Transaction {
    let transaction_type = match r.3.as_str() {
        "credit" => TransactionType::Credit,
        _ => TransactionType::Debit,
    };
    Transaction {
        id: r.0,
        account_id: AccountId(r.1),
        category_id: r.2.map(CategoryId),
        transaction_type,
        amount: Money::from_cents(r.4),
        description: r.5,
        merchant: r.6,
        category_parent_csv: r.7,
        date: r.8,
        import_batch: r.9,
        created_at: r.10,
    }
}

pub async fn insert_transaction<'e, E>(ex: E, tx: &NewTransaction) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        "INSERT INTO transactions (account_id, category_id, transaction_type, amount_cents, \
         description, merchant, category_parent_csv, date, import_batch, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(tx.account_id.0)
    .bind(tx.category_id.map(|c| c.0))
    .bind(tx.transaction_type.as_str())
    .bind(tx.amount.to_cents())
    .bind(&tx.description)
    .bind(&tx.merchant)
    .bind(&tx.category_parent_csv)
    .bind(tx.date)
    .bind(&tx.import_batch)
    .bind(Utc::now())
    .execute(ex)
    .await?;

    Ok(result.last_insert_rowid())
}

/// The dedup probe: exact match on the (account, date, amount, description)
/// triple, case-sensitive on description.
pub async fn transaction_exists<'e, E>(
    ex: E,
    account_id: AccountId,
    date: NaiveDate,
    amount: Money,
    description: &str,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row: (i64,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM transactions \
         WHERE account_id = ? AND date = ? AND amount_cents = ? AND description = ?)",
    )
    .bind(account_id.0)
    .bind(date)
    .bind(amount.to_cents())
    .bind(description)
    .fetch_one(ex)
    .await?;

    Ok(row.0 != 0)
}

pub async fn get_transaction<'e, E>(ex: E, id: i64) -> Result<Option<Transaction>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, TransactionRow>(&format!(
        "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(ex)
    .await?;

    Ok(row.map(map_transaction))
}

/// Inclusive date range, newest first, optionally scoped to one account.
pub async fn get_transactions_in_range(
    pool: &DbPool,
    range: DateRange,
    account_id: Option<AccountId>,
) -> Result<Vec<Transaction>, sqlx::Error> {
    let rows = match account_id {
        Some(account) => {
            sqlx::query_as::<_, TransactionRow>(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM transactions \
                 WHERE date >= ? AND date <= ? AND account_id = ? \
                 ORDER BY date DESC, id DESC"
            ))
            .bind(range.start)
            .bind(range.end)
            .bind(account.0)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, TransactionRow>(&format!(
                "SELECT {TRANSACTION_COLUMNS} FROM transactions \
                 WHERE date >= ? AND date <= ? \
                 ORDER BY date DESC, id DESC"
            ))
            .bind(range.start)
            .bind(range.end)
            .fetch_all(pool)
            .await?
        }
    };

    Ok(rows.into_iter().map(map_transaction).collect())
}

/// Every stored transaction still lacking a category, oldest first, for
/// the bulk-reapply scan.
pub async fn get_uncategorized_transactions<'e, E>(ex: E) -> Result<Vec<Transaction>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, TransactionRow>(&format!(
        "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE category_id IS NULL ORDER BY id"
    ))
    .fetch_all(ex)
    .await?;

    Ok(rows.into_iter().map(map_transaction).collect())
}

/// Returns the number of rows updated (0 when the id is unknown).
pub async fn set_transaction_category<'e, E>(
    ex: E,
    id: i64,
    category_id: CategoryId,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("UPDATE transactions SET category_id = ? WHERE id = ?")
        .bind(category_id.0)
        .bind(id)
        .execute(ex)
        .await?;

    Ok(result.rows_affected())
}
