//! Recipe line-up of a weekly menu and its aggregate score.

use sqlx::PgPool;
use tracing::{info, warn};

use super::{
    repo::{delete_link, find_link, insert_link},
    repo_types::WeeklyMenu,
};
use crate::{
    error::{AppError, AppResult},
    recipes::Recipe,
    resource::Resource,
};

/// Arithmetic mean of review scores; 0 for a menu nobody reviewed.
pub fn mean_score(scores: &[i32]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let total: i64 = scores.iter().copied().map(i64::from).sum();
    total as f64 / scores.len() as f64
}

async fn ensure_both_exist(db: &PgPool, menu_id: i64, recipe_id: i64) -> AppResult<()> {
    let menu = WeeklyMenu::find(db, menu_id).await?;
    let recipe = Recipe::find(db, recipe_id).await?;
    if menu.is_none() || recipe.is_none() {
        return Err(AppError::not_found(
            "no records found matching for given conditions, check recipe id and weekly menu id",
        ));
    }
    Ok(())
}

/// Schedules `recipe_id` in the menu. A pair can only be scheduled once.
pub async fn add_recipe(db: &PgPool, menu_id: i64, recipe_id: i64) -> AppResult<()> {
    ensure_both_exist(db, menu_id, recipe_id).await?;
    let duplicate = || {
        AppError::conflict(format!(
            "recipe {recipe_id} is already part of weekly menu {menu_id}"
        ))
    };
    if find_link(db, menu_id, recipe_id).await?.is_some() {
        warn!(menu_id, recipe_id, "recipe already scheduled");
        return Err(duplicate());
    }
    // unique (week_id, recipe_id) catches a concurrent insert of the same pair
    let link = insert_link(db, menu_id, recipe_id).await.map_err(|e| match e {
        AppError::Conflict(_) => duplicate(),
        other => other,
    })?;
    info!(menu_id, recipe_id, link_id = link.id, "recipe added to weekly menu");
    Ok(())
}

pub async fn remove_recipe(db: &PgPool, menu_id: i64, recipe_id: i64) -> AppResult<()> {
    let not_scheduled = || {
        AppError::not_found(format!(
            "recipe {recipe_id} is not part of weekly menu {menu_id}"
        ))
    };
    let link = find_link(db, menu_id, recipe_id)
        .await?
        .ok_or_else(not_scheduled)?;
    if delete_link(db, link.id).await? == 0 {
        return Err(not_scheduled());
    }
    info!(menu_id, recipe_id, "recipe removed from weekly menu");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_no_scores_is_zero() {
        assert_eq!(mean_score(&[]), 0.0);
    }

    #[test]
    fn mean_of_scores() {
        assert_eq!(mean_score(&[5, 3, 4]), 4.0);
        assert_eq!(mean_score(&[5, 4]), 4.5);
        assert_eq!(mean_score(&[1]), 1.0);
    }
}
