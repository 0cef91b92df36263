use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, warn};

use super::repo_types::{Customer, NewCustomer};
use crate::{
    auth::{
        handlers::{is_valid_name, validate_credentials},
        password::hash_password,
        repo_types::User,
    },
    error::{AppError, AppResult},
    resource::{
        apply_plan,
        fields::{Field, FieldKind, FieldValue, UpdatePlan},
        Deletion, Resource,
    },
};

/// Columns that live on the account rather than the profile.
const ACCOUNT_FIELDS: &[&str] = &["name"];

#[async_trait]
impl Resource for Customer {
    const KEY: &'static str = "customer";
    const NAME: &'static str = "Customer";
    const TABLE: &'static str = "customers";
    const SELECT: &'static str = "SELECT customers.id, users.public_id, users.name, users.is_admin, \
         customers.is_active, customers.created_at \
         FROM customers JOIN users ON users.id = customers.user_id";
    const DELETION: Deletion = Deletion::Soft { flag: "is_active" };
    const UPDATABLE: &'static [Field] = &[
        // is_admin is read-only here; no endpoint grants roles.
        Field::new("name", FieldKind::Text { min: 1, max: 64 }),
        Field::new("is_active", FieldKind::Bool),
    ];

    type New = NewCustomer;
    type View = Customer;

    async fn insert(db: &PgPool, new: NewCustomer) -> AppResult<Self> {
        let name = new.name.trim();
        validate_credentials(name, &new.password)?;
        let hash = hash_password(&new.password)?;

        let mut tx = db.begin().await.context("begin tx")?;
        let user = User::create(&mut *tx, name, &hash).await.map_err(|e| {
            match AppError::from(e) {
                AppError::Conflict(_) => {
                    warn!(name = %name, "name already registered");
                    AppError::conflict(format!("{name} is already registered"))
                }
                other => other,
            }
        })?;
        let (id, is_active, created_at) = sqlx::query_as::<_, (i64, bool, time::OffsetDateTime)>(
            r#"
            INSERT INTO customers (user_id, is_active)
            VALUES ($1, TRUE)
            RETURNING id, is_active, created_at
            "#,
        )
        .bind(user.id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await.context("commit tx")?;

        Ok(Customer {
            id,
            public_id: user.public_id,
            name: user.name,
            is_admin: user.is_admin,
            is_active,
            created_at,
        })
    }

    async fn present(_db: &PgPool, rows: Vec<Self>) -> AppResult<Vec<Self::View>> {
        Ok(rows)
    }

    /// Splits the plan between `users` and `customers` and applies both halves together.
    async fn update(db: &PgPool, id: i64, mut plan: UpdatePlan) -> AppResult<()> {
        let account = plan.take(ACCOUNT_FIELDS);
        if let Some(FieldValue::Text(name)) = account.get("name") {
            if !is_valid_name(name) {
                return Err(AppError::validation(
                    "name must be 1-64 characters of letters, digits, '_', '.' or '-'",
                ));
            }
        }

        let mut tx = db.begin().await.context("begin tx")?;
        let user_id = sqlx::query_scalar::<_, i64>("SELECT user_id FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Customer {id} does not exist")))?;

        apply_plan(&mut *tx, "users", user_id, account).await?;
        apply_plan(&mut *tx, Self::TABLE, id, plan).await?;
        tx.commit().await.context("commit tx")?;
        debug!(customer_id = id, user_id, "customer updated");
        Ok(())
    }
}
