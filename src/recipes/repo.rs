use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{types::Json, PgPool};

use super::repo_types::{NewRecipe, Recipe, RecipeView};
use crate::{
    error::AppResult,
    ingredients::{self, Ingredient},
    resource::{
        fields::{check_int, check_text, Field, FieldKind},
        Deletion, Resource,
    },
};

#[async_trait]
impl Resource for Recipe {
    const KEY: &'static str = "recipes";
    const NAME: &'static str = "Recipe";
    const TABLE: &'static str = "recipes";
    const SELECT: &'static str = "SELECT id, name, description, servings, cook_time, directions, \
         nutrition, is_publish, classification_id, created_at FROM recipes";
    const DELETION: Deletion = Deletion::Soft { flag: "is_publish" };
    const UPDATABLE: &'static [Field] = &[
        Field::new("name", FieldKind::Text { min: 1, max: 255 }),
        Field::new("description", FieldKind::Text { min: 0, max: 10_000 }),
        Field::new("servings", FieldKind::Int { min: 1, max: 32767 }),
        Field::new("cook_time", FieldKind::Int { min: 0, max: 32767 }),
        Field::new("directions", FieldKind::Text { min: 0, max: 10_000 }),
        Field::new("nutrition", FieldKind::StringMap),
        Field::new("is_publish", FieldKind::Bool),
        Field::new("classification_id", FieldKind::ForeignId),
    ];

    type New = NewRecipe;
    type View = RecipeView;

    async fn insert(db: &PgPool, new: NewRecipe) -> AppResult<Self> {
        check_text(Self::UPDATABLE, "name", &new.name)?;
        check_text(Self::UPDATABLE, "description", &new.description)?;
        check_text(Self::UPDATABLE, "directions", &new.directions)?;
        check_int(Self::UPDATABLE, "servings", i64::from(new.servings))?;
        check_int(Self::UPDATABLE, "cook_time", i64::from(new.cook_time))?;

        let row = sqlx::query_as::<_, Recipe>(
            r#"
            INSERT INTO recipes
                (name, description, servings, cook_time, directions, nutrition, is_publish, classification_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, description, servings, cook_time, directions,
                      nutrition, is_publish, classification_id, created_at
            "#,
        )
        .bind(new.name.trim())
        .bind(new.description.trim())
        .bind(new.servings)
        .bind(new.cook_time)
        .bind(new.directions.trim())
        .bind(Json(new.nutrition))
        .bind(new.is_publish)
        .bind(new.classification_id)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    async fn present(db: &PgPool, rows: Vec<Self>) -> AppResult<Vec<RecipeView>> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut by_recipe: HashMap<i64, Vec<Ingredient>> = HashMap::new();
        for ingredient in ingredients::for_recipes(db, &ids).await? {
            by_recipe.entry(ingredient.recipe_id).or_default().push(ingredient);
        }
        Ok(rows
            .into_iter()
            .map(|recipe| RecipeView {
                ingredients: by_recipe.remove(&recipe.id).unwrap_or_default(),
                recipe,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_payload_applies_defaults() {
        let new: NewRecipe =
            serde_json::from_value(json!({"name": "Maggie", "classification_id": 4})).unwrap();
        assert_eq!(new.servings, 2);
        assert_eq!(new.cook_time, 30);
        assert_eq!(new.description, "");
        assert!(!new.is_publish);
        assert!(new.nutrition.is_empty());
    }

    #[test]
    fn create_payload_requires_a_name() {
        let err = serde_json::from_value::<NewRecipe>(json!({"classification_id": 4})).unwrap_err();
        assert!(err.to_string().contains("name"));
        assert!(check_text(Recipe::UPDATABLE, "name", "  ").is_err());
    }

    #[test]
    fn create_payload_accepts_string_numbers() {
        let new: NewRecipe = serde_json::from_value(json!({
            "classification_id": 4,
            "cook_time": "15",
            "description": "Maggie",
            "directions": "Boil and Enjoy",
            "is_publish": "True",
            "servings": "2",
            "nutrition": {"Energy (kJ)": "1264kJ"},
            "name": "Maggie"
        }))
        .unwrap();
        assert_eq!(new.cook_time, 15);
        assert!(new.is_publish);
        assert_eq!(new.nutrition["Energy (kJ)"], "1264kJ");
    }

    #[test]
    fn view_flattens_recipe_and_lists_ingredients() {
        let now = time::OffsetDateTime::now_utc();
        let view = RecipeView {
            recipe: Recipe {
                id: 3,
                name: "Soup".into(),
                description: String::new(),
                servings: 2,
                cook_time: 30,
                directions: String::new(),
                nutrition: Json(Default::default()),
                is_publish: true,
                classification_id: 1,
                created_at: now,
            },
            ingredients: vec![Ingredient {
                id: 9,
                name: "salt".into(),
                unit: "g".into(),
                count: 2,
                recipe_id: 3,
                created_at: now,
            }],
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["nutrition"], json!({}));
        assert_eq!(json["ingredients"][0]["name"], "salt");
    }
}
