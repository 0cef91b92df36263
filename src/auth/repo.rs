use crate::auth::repo_types::User;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, public_id, name, password_hash, is_admin, created_at";

impl User {
    /// Find a user by login name.
    pub async fn find_by_name(db: &PgPool, name: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE name = $1"))
            .bind(name)
            .fetch_optional(db)
            .await
    }

    /// Resolve a token subject.
    pub async fn find_by_public_id(
        db: &PgPool,
        public_id: Uuid,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE public_id = $1"
        ))
        .bind(public_id)
        .fetch_optional(db)
        .await
    }

    /// Create a new user with a hashed password and a fresh public id.
    pub async fn create<'e, E>(db: E, name: &str, password_hash: &str) -> Result<User, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (public_id, name, password_hash, is_admin)
            VALUES ($1, $2, $3, FALSE)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }

    pub async fn list(db: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(db)
            .await
    }
}
