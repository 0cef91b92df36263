use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{NewRecipeReview, NewWeeklyMenuReview, RecipeReview, WeeklyMenuReview};
use crate::{
    error::AppResult,
    resource::{
        fields::{check_int, check_text, Field, FieldKind},
        Deletion, Resource,
    },
};

const REVIEW_FIELDS: &[Field] = &[
    Field::new("text", FieldKind::Text { min: 1, max: 10_000 }),
    Field::new("score", FieldKind::Int { min: 1, max: 5 }),
    Field::new("summary", FieldKind::Text { min: 0, max: 255 }),
    Field::new("is_publish", FieldKind::Bool),
];

#[async_trait]
impl Resource for RecipeReview {
    const KEY: &'static str = "recipe-review";
    const NAME: &'static str = "RecipeReview";
    const TABLE: &'static str = "recipe_reviews";
    const SELECT: &'static str = "SELECT id, recipe_id, customer_id, text, score, summary, \
         is_publish, published_at FROM recipe_reviews";
    const DELETION: Deletion = Deletion::Soft { flag: "is_publish" };
    const UPDATABLE: &'static [Field] = REVIEW_FIELDS;

    type New = NewRecipeReview;
    type View = RecipeReview;

    async fn insert(db: &PgPool, new: NewRecipeReview) -> AppResult<Self> {
        check_text(REVIEW_FIELDS, "text", &new.text)?;
        check_text(REVIEW_FIELDS, "summary", &new.summary)?;
        check_int(REVIEW_FIELDS, "score", i64::from(new.score))?;
        let row = sqlx::query_as::<_, RecipeReview>(
            r#"
            INSERT INTO recipe_reviews (recipe_id, customer_id, text, score, summary, is_publish)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, recipe_id, customer_id, text, score, summary, is_publish, published_at
            "#,
        )
        .bind(new.recipe_id)
        .bind(new.customer_id)
        .bind(new.text.trim())
        .bind(new.score)
        .bind(new.summary.trim())
        .bind(new.is_publish)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    async fn present(_db: &PgPool, rows: Vec<Self>) -> AppResult<Vec<Self::View>> {
        Ok(rows)
    }
}

#[async_trait]
impl Resource for WeeklyMenuReview {
    const KEY: &'static str = "weekly-menu-review";
    const NAME: &'static str = "WeeklyMenuReview";
    const TABLE: &'static str = "weekly_menu_reviews";
    const SELECT: &'static str = "SELECT id, menu_id, customer_id, text, score, summary, \
         is_publish, published_at FROM weekly_menu_reviews";
    const DELETION: Deletion = Deletion::Soft { flag: "is_publish" };
    const UPDATABLE: &'static [Field] = REVIEW_FIELDS;

    type New = NewWeeklyMenuReview;
    type View = WeeklyMenuReview;

    async fn insert(db: &PgPool, new: NewWeeklyMenuReview) -> AppResult<Self> {
        check_text(REVIEW_FIELDS, "text", &new.text)?;
        check_text(REVIEW_FIELDS, "summary", &new.summary)?;
        check_int(REVIEW_FIELDS, "score", i64::from(new.score))?;
        let row = sqlx::query_as::<_, WeeklyMenuReview>(
            r#"
            INSERT INTO weekly_menu_reviews (menu_id, customer_id, text, score, summary, is_publish)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, menu_id, customer_id, text, score, summary, is_publish, published_at
            "#,
        )
        .bind(new.menu_id)
        .bind(new.customer_id)
        .bind(new.text.trim())
        .bind(new.score)
        .bind(new.summary.trim())
        .bind(new.is_publish)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    async fn present(_db: &PgPool, rows: Vec<Self>) -> AppResult<Vec<Self::View>> {
        Ok(rows)
    }
}

/// `(menu_id, score)` for every review of the given menus.
pub async fn menu_scores(db: &PgPool, menu_ids: &[i64]) -> AppResult<Vec<(i64, i32)>> {
    let rows = sqlx::query_as::<_, (i64, i32)>(
        "SELECT menu_id, score FROM weekly_menu_reviews WHERE menu_id = ANY($1)",
    )
    .bind(menu_ids)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
