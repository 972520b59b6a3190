use centime_core::{Category, CategoryId};
use sqlx::{Executor, Sqlite};

use super::db::DbPool;

fn map_category(r: (i64, String, String, String)) -> Category {
    Category {
        id: CategoryId(r.0),
        name: r.1,
        parent_category: r.2,
        sub_category: r.3,
    }
}

pub async fn get_all_categories(pool: &DbPool) -> Result<Vec<Category>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64, String, String, String)>(
        "SELECT id, name, parent_category, sub_category FROM categories ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(map_category).collect())
}

pub async fn get_category<'e, E>(ex: E, id: CategoryId) -> Result<Option<Category>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, (i64, String, String, String)>(
        "SELECT id, name, parent_category, sub_category FROM categories WHERE id = ?",
    )
    .bind(id.0)
    .fetch_optional(ex)
    .await?;

    Ok(row.map(map_category))
}

/// Plain insert. No uniqueness check on the (name, parent, sub) triple;
/// duplicate creation is a documented possibility.
pub async fn insert_category<'e, E>(
    ex: E,
    name: &str,
    parent_category: &str,
    sub_category: &str,
) -> Result<Category, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result =
        sqlx::query("INSERT INTO categories (name, parent_category, sub_category) VALUES (?, ?, ?)")
            .bind(name)
            .bind(parent_category)
            .bind(sub_category)
            .execute(ex)
            .await?;

    Ok(Category {
        id: CategoryId(result.last_insert_rowid()),
        name: name.to_string(),
        parent_category: parent_category.to_string(),
        sub_category: sub_category.to_string(),
    })
}
