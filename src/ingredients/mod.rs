mod repo;
mod repo_types;

pub use repo::for_recipes;
pub use repo_types::{Ingredient, NewIngredient};
