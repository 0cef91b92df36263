use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::resource::lenient;

/// One line of a recipe's ingredient list. Unique per (name, recipe).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub unit: String,
    pub count: i32,
    pub recipe_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewIngredient {
    pub name: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub count: i32,
    #[serde(deserialize_with = "lenient::number")]
    pub recipe_id: i64,
}
