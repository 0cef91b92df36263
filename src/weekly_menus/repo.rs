use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use super::{
    repo_types::{NewWeeklyMenu, WeeklyMenu, WeeklyMenuView, WeeklyRecipeMap},
    services::mean_score,
};
use crate::{
    error::{AppError, AppResult},
    resource::{
        fields::{check_int, Field, FieldKind},
        Deletion, Resource,
    },
    reviews,
};

const FIELDS: &[Field] = &[
    Field::new("week_number", FieldKind::Int { min: 1, max: 53 }),
    Field::new("is_publish", FieldKind::Bool),
];

#[async_trait]
impl Resource for WeeklyMenu {
    const KEY: &'static str = "weekly-menu";
    const NAME: &'static str = "WeeklyMenu";
    const TABLE: &'static str = "weekly_menus";
    const SELECT: &'static str = "SELECT id, week_number, is_publish, created_at FROM weekly_menus";
    const DELETION: Deletion = Deletion::Soft { flag: "is_publish" };
    const UPDATABLE: &'static [Field] = FIELDS;

    type New = NewWeeklyMenu;
    type View = WeeklyMenuView;

    async fn insert(db: &PgPool, new: NewWeeklyMenu) -> AppResult<Self> {
        check_int(FIELDS, "week_number", i64::from(new.week_number))?;
        sqlx::query_as::<_, WeeklyMenu>(
            r#"
            INSERT INTO weekly_menus (week_number, is_publish)
            VALUES ($1, $2)
            RETURNING id, week_number, is_publish, created_at
            "#,
        )
        .bind(new.week_number)
        .bind(new.is_publish)
        .fetch_one(db)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => {
                AppError::conflict(format!("week {} already has a menu", new.week_number))
            }
            other => other,
        })
    }

    async fn present(db: &PgPool, rows: Vec<Self>) -> AppResult<Vec<WeeklyMenuView>> {
        let ids: Vec<i64> = rows.iter().map(|m| m.id).collect();

        let mut recipes: HashMap<i64, Vec<WeeklyRecipeMap>> = HashMap::new();
        for link in recipe_links(db, &ids).await? {
            recipes.entry(link.week_id).or_default().push(link);
        }
        let mut scores: HashMap<i64, Vec<i32>> = HashMap::new();
        for (menu_id, score) in reviews::menu_scores(db, &ids).await? {
            scores.entry(menu_id).or_default().push(score);
        }

        Ok(rows
            .into_iter()
            .map(|menu| WeeklyMenuView {
                recipes: recipes.remove(&menu.id).unwrap_or_default(),
                score: mean_score(scores.get(&menu.id).map(Vec::as_slice).unwrap_or_default()),
                menu,
            })
            .collect())
    }
}

async fn recipe_links(db: &PgPool, menu_ids: &[i64]) -> AppResult<Vec<WeeklyRecipeMap>> {
    let rows = sqlx::query_as::<_, WeeklyRecipeMap>(
        r#"
        SELECT id, week_id, recipe_id
          FROM weekly_recipe_map
         WHERE week_id = ANY($1)
         ORDER BY id
        "#,
    )
    .bind(menu_ids)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub(super) async fn find_link(
    db: &PgPool,
    menu_id: i64,
    recipe_id: i64,
) -> AppResult<Option<WeeklyRecipeMap>> {
    let row = sqlx::query_as::<_, WeeklyRecipeMap>(
        "SELECT id, week_id, recipe_id FROM weekly_recipe_map WHERE week_id = $1 AND recipe_id = $2",
    )
    .bind(menu_id)
    .bind(recipe_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub(super) async fn insert_link(db: &PgPool, menu_id: i64, recipe_id: i64) -> AppResult<WeeklyRecipeMap> {
    let row = sqlx::query_as::<_, WeeklyRecipeMap>(
        r#"
        INSERT INTO weekly_recipe_map (week_id, recipe_id)
        VALUES ($1, $2)
        RETURNING id, week_id, recipe_id
        "#,
    )
    .bind(menu_id)
    .bind(recipe_id)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub(super) async fn delete_link(db: &PgPool, link_id: i64) -> AppResult<u64> {
    let res = sqlx::query("DELETE FROM weekly_recipe_map WHERE id = $1")
        .bind(link_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}
