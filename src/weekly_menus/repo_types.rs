use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::resource::lenient;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WeeklyMenu {
    pub id: i64,
    pub week_number: i32,
    pub is_publish: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// One recipe scheduled in one week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct WeeklyRecipeMap {
    pub id: i64,
    pub week_id: i64,
    pub recipe_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyMenuView {
    #[serde(flatten)]
    pub menu: WeeklyMenu,
    pub recipes: Vec<WeeklyRecipeMap>,
    /// Mean review score, 0 when the menu has no reviews.
    pub score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewWeeklyMenu {
    #[serde(deserialize_with = "lenient::number")]
    pub week_number: i32,
    #[serde(default = "published", deserialize_with = "lenient::boolean")]
    pub is_publish: bool,
}

fn published() -> bool {
    true
}
