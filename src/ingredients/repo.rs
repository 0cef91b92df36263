use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{Ingredient, NewIngredient};
use crate::{
    error::{AppError, AppResult},
    resource::{
        fields::{check_int, check_text, Field, FieldKind},
        Deletion, Resource,
    },
};

const COLUMNS: &str = "id, name, unit, count, recipe_id, created_at";

#[async_trait]
impl Resource for Ingredient {
    const KEY: &'static str = "ingredient";
    const NAME: &'static str = "Ingredient";
    const TABLE: &'static str = "ingredients";
    const SELECT: &'static str =
        "SELECT id, name, unit, count, recipe_id, created_at FROM ingredients";
    const DELETION: Deletion = Deletion::Hard;
    const UPDATABLE: &'static [Field] = &[
        Field::new("name", FieldKind::Text { min: 1, max: 255 }),
        Field::new("unit", FieldKind::Text { min: 0, max: 32 }),
        Field::new("count", FieldKind::Int { min: 0, max: i32::MAX as i64 }),
        Field::new("recipe_id", FieldKind::ForeignId),
    ];

    type New = NewIngredient;
    type View = Ingredient;

    async fn insert(db: &PgPool, new: NewIngredient) -> AppResult<Self> {
        let name = new.name.trim();
        check_text(Self::UPDATABLE, "name", name)?;
        check_text(Self::UPDATABLE, "unit", &new.unit)?;
        check_int(Self::UPDATABLE, "count", i64::from(new.count))?;

        let row = sqlx::query_as::<_, Ingredient>(&format!(
            r#"
            INSERT INTO ingredients (name, unit, count, recipe_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(name)
        .bind(new.unit.trim())
        .bind(new.count)
        .bind(new.recipe_id)
        .fetch_one(db)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::conflict(format!(
                "ingredient '{name}' already exists for recipe {}",
                new.recipe_id
            )),
            other => other,
        })?;
        Ok(row)
    }

    async fn present(_db: &PgPool, rows: Vec<Self>) -> AppResult<Vec<Self::View>> {
        Ok(rows)
    }
}

/// Ingredients of every recipe in `recipe_ids`, ordered by id.
pub async fn for_recipes(db: &PgPool, recipe_ids: &[i64]) -> AppResult<Vec<Ingredient>> {
    let rows = sqlx::query_as::<_, Ingredient>(&format!(
        "SELECT {COLUMNS} FROM ingredients WHERE recipe_id = ANY($1) ORDER BY id"
    ))
    .bind(recipe_ids)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_the_string_forms_clients_send() {
        let new: NewIngredient = serde_json::from_value(json!({
            "name": "makrut lime leaves",
            "unit": "leaves",
            "count": "2",
            "recipe_id": "7"
        }))
        .unwrap();
        assert_eq!(new.count, 2);
        assert_eq!(new.recipe_id, 7);
    }

    #[test]
    fn recipe_is_required() {
        assert!(serde_json::from_value::<NewIngredient>(json!({"name": "salt"})).is_err());
    }

    #[test]
    fn hard_deleted() {
        assert_eq!(Ingredient::DELETION, Deletion::Hard);
    }
}
