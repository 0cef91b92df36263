//! The CRUD surface shared by every catalog entity.
//!
//! An entity implements [`Resource`] once (table, select clause, deletion
//! mode, update allow-list, typed create payload) and gets list, get,
//! create, delete and partial-update endpoints from [`handlers::routes`].

pub mod envelope;
pub mod fields;
pub mod handlers;
pub mod lenient;
mod repo;

pub(crate) use repo::apply_plan;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{postgres::PgRow, FromRow, PgPool};

use crate::error::AppResult;
use envelope::Page;
use fields::{Field, UpdatePlan};

/// How a row leaves the public API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    /// Flip `flag` to false; listings only show rows where `flag` is true.
    Soft { flag: &'static str },
    /// Physically remove the row; listings show every row.
    Hard,
}

#[async_trait]
pub trait Resource: for<'r> FromRow<'r, PgRow> + Send + Sync + Unpin + 'static {
    /// Route segment and envelope key, e.g. `recipes`.
    const KEY: &'static str;
    /// Name used in messages, e.g. `Recipe`.
    const NAME: &'static str;
    /// Table owning `id` and the soft-delete flag.
    const TABLE: &'static str;
    /// `SELECT ... FROM ...` producing rows of `Self`; columns qualified with `TABLE` where ambiguous.
    const SELECT: &'static str;
    const DELETION: Deletion;
    const UPDATABLE: &'static [Field];

    /// Create payload.
    type New: DeserializeOwned + Send + 'static;
    /// Serialized form, possibly enriched with related rows.
    type View: Serialize + Send + 'static;

    async fn insert(db: &PgPool, new: Self::New) -> AppResult<Self>;

    async fn present(db: &PgPool, rows: Vec<Self>) -> AppResult<Vec<Self::View>>;

    /// Visible rows for one page, ordered by id.
    async fn list(db: &PgPool, page: Page) -> AppResult<Vec<Self>> {
        repo::list_visible::<Self>(db, page).await
    }

    /// Any row by id, regardless of visibility.
    async fn find(db: &PgPool, id: i64) -> AppResult<Option<Self>> {
        repo::find_by_id::<Self>(db, id).await
    }

    async fn update(db: &PgPool, id: i64, plan: UpdatePlan) -> AppResult<()> {
        repo::apply_plan(db, Self::TABLE, id, plan).await
    }

    async fn delete(db: &PgPool, id: i64) -> AppResult<()> {
        repo::delete::<Self>(db, id).await
    }
}
