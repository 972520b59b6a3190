//! The ingestion pipeline: parse a statement payload, detect duplicates
//! against stored rows, persist the survivors, and run the rule engine in
//! assign-if-unset mode — all inside one database transaction so that a
//! concurrent overlapping import cannot double-insert a row between the
//! duplicate probe and the insert.

use uuid::Uuid;

use centime_core::AccountId;
use centime_import::{parse_statement, BankProfile, ImportStats, RuleEngine};
use centime_storage::{self as storage, DbPool, NewTransaction};

use crate::error::AppError;

pub async fn run_import(
    db: &DbPool,
    profile: &BankProfile,
    account_id: AccountId,
    payload: &[u8],
) -> Result<ImportStats, AppError> {
    if storage::get_account(db, account_id).await?.is_none() {
        return Err(AppError::NotFound(format!("account {account_id} not found")));
    }

    let outcomes = parse_statement(payload, profile)?;
    let batch_id = Uuid::new_v4().to_string();

    let mut stats = ImportStats {
        total_rows: outcomes.len(),
        ..Default::default()
    };

    let mut dbtx = db.begin().await?;
    let engine = RuleEngine::new(storage::get_active_rules(&mut *dbtx).await?);

    for outcome in outcomes {
        let row = match outcome.result {
            Ok(row) => row,
            Err(e) => {
                stats.errors += 1;
                stats.error_details.push(format!("row {}: {}", outcome.row, e));
                continue;
            }
        };

        let duplicate = storage::transaction_exists(
            &mut *dbtx,
            account_id,
            row.date,
            row.amount,
            &row.description,
        )
        .await?;
        if duplicate {
            stats.duplicates += 1;
            continue;
        }

        let new_tx = NewTransaction {
            account_id,
            category_id: None,
            transaction_type: row.transaction_type,
            amount: row.amount,
            description: row.description,
            merchant: row.merchant,
            category_parent_csv: row.category_parent,
            date: row.date,
            import_batch: Some(batch_id.clone()),
        };
        let id = storage::insert_transaction(&mut *dbtx, &new_tx).await?;

        // Assign-if-unset: freshly inserted rows have no category, so the
        // first matching rule decides.
        if let Some(category) = engine.categorize(&new_tx.description, new_tx.merchant.as_deref())
        {
            storage::set_transaction_category(&mut *dbtx, id, category).await?;
        }

        stats.imported += 1;
    }

    dbtx.commit().await?;

    tracing::info!(
        batch = %batch_id,
        total = stats.total_rows,
        imported = stats.imported,
        duplicates = stats.duplicates,
        errors = stats.errors,
        "statement import finished"
    );

    Ok(stats)
}
