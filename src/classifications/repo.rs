use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{NewRecipeClassification, RecipeClassification};
use crate::{
    error::AppResult,
    resource::{
        fields::{check_text, Field, FieldKind},
        Deletion, Resource,
    },
};

#[async_trait]
impl Resource for RecipeClassification {
    const KEY: &'static str = "recipes-classification";
    const NAME: &'static str = "RecipeClassification";
    const TABLE: &'static str = "recipe_classifications";
    const SELECT: &'static str =
        "SELECT id, name, is_publish, created_at FROM recipe_classifications";
    const DELETION: Deletion = Deletion::Soft { flag: "is_publish" };
    const UPDATABLE: &'static [Field] = &[
        Field::new("name", FieldKind::Text { min: 1, max: 35 }),
        Field::new("is_publish", FieldKind::Bool),
    ];

    type New = NewRecipeClassification;
    type View = RecipeClassification;

    async fn insert(db: &PgPool, new: NewRecipeClassification) -> AppResult<Self> {
        let name = new.name.trim();
        check_text(Self::UPDATABLE, "name", name)?;
        let row = sqlx::query_as::<_, RecipeClassification>(
            r#"
            INSERT INTO recipe_classifications (name, is_publish)
            VALUES ($1, $2)
            RETURNING id, name, is_publish, created_at
            "#,
        )
        .bind(name)
        .bind(new.is_publish)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    async fn present(_db: &PgPool, rows: Vec<Self>) -> AppResult<Vec<Self::View>> {
        Ok(rows)
    }
}
