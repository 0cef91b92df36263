use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::resource::lenient;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecipeReview {
    pub id: i64,
    pub recipe_id: i64,
    pub customer_id: i64,
    pub text: String,
    pub score: i32, // 1 very dissatisfied .. 5 excellent
    pub summary: String,
    pub is_publish: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WeeklyMenuReview {
    pub id: i64,
    pub menu_id: i64,
    pub customer_id: i64,
    pub text: String,
    pub score: i32,
    pub summary: String,
    pub is_publish: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub published_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewRecipeReview {
    #[serde(deserialize_with = "lenient::number")]
    pub recipe_id: i64,
    #[serde(deserialize_with = "lenient::number")]
    pub customer_id: i64,
    pub text: String,
    #[serde(default = "default_score", deserialize_with = "lenient::number")]
    pub score: i32,
    #[serde(default)]
    pub summary: String,
    #[serde(default = "published", deserialize_with = "lenient::boolean")]
    pub is_publish: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewWeeklyMenuReview {
    #[serde(deserialize_with = "lenient::number")]
    pub menu_id: i64,
    #[serde(deserialize_with = "lenient::number")]
    pub customer_id: i64,
    pub text: String,
    #[serde(default = "default_score", deserialize_with = "lenient::number")]
    pub score: i32,
    #[serde(default)]
    pub summary: String,
    #[serde(default = "published", deserialize_with = "lenient::boolean")]
    pub is_publish: bool,
}

fn default_score() -> i32 {
    5
}

fn published() -> bool {
    true
}
