use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::resource::lenient;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecipeClassification {
    pub id: i64,
    pub name: String,
    pub is_publish: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewRecipeClassification {
    pub name: String,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub is_publish: bool,
}
