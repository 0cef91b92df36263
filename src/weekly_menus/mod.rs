//! Weekly menus, their recipe line-up and their review score.

pub mod handlers;
mod repo;
mod repo_types;
pub mod services;

pub use repo_types::{NewWeeklyMenu, WeeklyMenu, WeeklyMenuView, WeeklyRecipeMap};
