//! Customer reviews of recipes and of weekly menus.

mod repo;
mod repo_types;

pub use repo::menu_scores;
pub use repo_types::{NewRecipeReview, NewWeeklyMenuReview, RecipeReview, WeeklyMenuReview};
