use axum::{
    extract::{rejection::PathRejection, OriginalUri, Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::instrument;

use super::{repo_types::WeeklyMenu, services, WeeklyMenuView};
use crate::{
    auth::extractors::AuthUser,
    error::AppResult,
    resource::{
        envelope::Envelope,
        handlers::{path_value, present_one},
        Resource,
    },
    state::AppState,
};

pub fn menu_recipe_routes() -> Router<AppState> {
    Router::new().route(
        "/weekly-menu/id/:id/recipe/id/:recipe_id",
        post(add_recipe).delete(remove_recipe),
    )
}

#[instrument(skip(state, _caller, ids, uri))]
pub async fn add_recipe(
    State(state): State<AppState>,
    _caller: AuthUser,
    ids: Result<Path<(i64, i64)>, PathRejection>,
    OriginalUri(uri): OriginalUri,
) -> AppResult<(StatusCode, Json<Envelope<WeeklyMenuView>>)> {
    let (menu_id, recipe_id) = path_value(ids)?;
    services::add_recipe(&state.db, menu_id, recipe_id).await?;
    let view = present_one::<WeeklyMenu>(&state.db, menu_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::single(WeeklyMenu::KEY, view, uri.to_string())),
    ))
}

#[instrument(skip(state, _caller, ids, uri))]
pub async fn remove_recipe(
    State(state): State<AppState>,
    _caller: AuthUser,
    ids: Result<Path<(i64, i64)>, PathRejection>,
    OriginalUri(uri): OriginalUri,
) -> AppResult<Json<Envelope<WeeklyMenuView>>> {
    let (menu_id, recipe_id) = path_value(ids)?;
    services::remove_recipe(&state.db, menu_id, recipe_id).await?;
    let view = present_one::<WeeklyMenu>(&state.db, menu_id).await?;
    Ok(Json(Envelope::single(WeeklyMenu::KEY, view, uri.to_string())))
}
