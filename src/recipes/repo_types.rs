use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;

use crate::{ingredients::Ingredient, resource::lenient};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub servings: i32,
    pub cook_time: i32,          // minutes
    pub directions: String,
    pub nutrition: Json<BTreeMap<String, String>>,
    pub is_publish: bool,
    pub classification_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A recipe together with its ingredient list.
#[derive(Debug, Serialize)]
pub struct RecipeView {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub ingredients: Vec<Ingredient>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewRecipe {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_servings", deserialize_with = "lenient::number")]
    pub servings: i32,
    #[serde(default = "default_cook_time", deserialize_with = "lenient::number")]
    pub cook_time: i32,
    #[serde(default)]
    pub directions: String,
    #[serde(default)]
    pub nutrition: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub is_publish: bool,
    #[serde(deserialize_with = "lenient::number")]
    pub classification_id: i64,
}

fn default_servings() -> i32 {
    2
}

fn default_cook_time() -> i32 {
    30
}
