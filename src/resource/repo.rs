use sqlx::{PgExecutor, PgPool};
use tracing::debug;

use super::{
    envelope::{Page, PER_PAGE},
    fields::UpdatePlan,
    Deletion, Resource,
};
use crate::error::{AppError, AppResult};

fn list_sql<T: Resource>() -> String {
    match T::DELETION {
        Deletion::Soft { flag } => format!(
            "{} WHERE {table}.{flag} ORDER BY {table}.id LIMIT $1 OFFSET $2",
            T::SELECT,
            table = T::TABLE,
        ),
        Deletion::Hard => format!(
            "{} ORDER BY {table}.id LIMIT $1 OFFSET $2",
            T::SELECT,
            table = T::TABLE,
        ),
    }
}

pub(super) async fn list_visible<T: Resource>(db: &PgPool, page: Page) -> AppResult<Vec<T>> {
    let rows = sqlx::query_as::<_, T>(&list_sql::<T>())
        .bind(PER_PAGE)
        .bind(page.offset())
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub(super) async fn find_by_id<T: Resource>(db: &PgPool, id: i64) -> AppResult<Option<T>> {
    let row = sqlx::query_as::<_, T>(&format!("{} WHERE {}.id = $1", T::SELECT, T::TABLE))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub(crate) async fn apply_plan<'e, E>(db: E, table: &str, id: i64, plan: UpdatePlan) -> AppResult<()>
where
    E: PgExecutor<'e>,
{
    if plan.is_empty() {
        return Ok(());
    }
    let mut qb = plan.into_query(table, "id", id);
    let res = qb.build().execute(db).await?;
    debug!(table, id, rows = res.rows_affected(), "row updated");
    Ok(())
}

pub(super) async fn delete<T: Resource>(db: &PgPool, id: i64) -> AppResult<()> {
    match T::DELETION {
        Deletion::Soft { flag } => {
            let hit = sqlx::query_scalar::<_, i64>(&format!(
                "UPDATE {table} SET {flag} = FALSE WHERE id = $1 AND {flag} RETURNING id",
                table = T::TABLE,
            ))
            .bind(id)
            .fetch_optional(db)
            .await?;
            hit.map(|_| ()).ok_or_else(|| {
                AppError::not_found(format!("{} already deleted or does not exist", T::NAME))
            })
        }
        Deletion::Hard => {
            let res = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", T::TABLE))
                .bind(id)
                .execute(db)
                .await?;
            if res.rows_affected() == 0 {
                return Err(AppError::Gone(format!(
                    "{} {id} is no longer available at the server",
                    T::NAME
                )));
            }
            Ok(())
        }
    }
}
