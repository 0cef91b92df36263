use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        OriginalUri, Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{Map, Value};
use tracing::{info, instrument};

use super::{
    envelope::{Envelope, Page},
    fields::UpdatePlan,
    Resource,
};
use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppResult},
    state::AppState,
};

/// `/{key}`, `/{key}/:page` and `/{key}/id/:id` for one entity.
pub fn routes<T: Resource>() -> Router<AppState> {
    let base = format!("/{}", T::KEY);
    Router::new()
        .route(&base, get(list_first::<T>).post(create::<T>))
        .route(&format!("{base}/:page"), get(list_page::<T>))
        .route(
            &format!("{base}/id/:id"),
            get(get_one::<T>).delete(delete_one::<T>).put(update_one::<T>),
        )
}

pub(crate) fn path_value<P>(p: Result<Path<P>, PathRejection>) -> AppResult<P> {
    p.map(|Path(v)| v).map_err(|e| AppError::validation(e.body_text()))
}

/// Loads one row and renders it through `present`.
pub(crate) async fn present_one<T: Resource>(db: &sqlx::PgPool, id: i64) -> AppResult<T::View> {
    let row = T::find(db, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("{} {id} does not exist", T::NAME)))?;
    T::present(db, vec![row])
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found(format!("{} {id} does not exist", T::NAME)))
}

async fn list_in<T: Resource>(
    state: &AppState,
    page: Page,
    uri: String,
) -> AppResult<Json<Envelope<T::View>>> {
    let rows = T::list(&state.db, page).await?;
    if rows.is_empty() {
        return Err(AppError::not_found(format!(
            "No matching {} records found",
            T::NAME
        )));
    }
    let items = T::present(&state.db, rows).await?;
    info!(resource = T::KEY, page = page.number(), count = items.len(), "listed");
    Ok(Json(Envelope::page(T::KEY, items, page, uri)))
}

#[instrument(skip_all, fields(resource = T::KEY))]
pub async fn list_first<T: Resource>(
    State(state): State<AppState>,
    _caller: AuthUser,
    OriginalUri(uri): OriginalUri,
) -> AppResult<Json<Envelope<T::View>>> {
    list_in::<T>(&state, Page::FIRST, uri.to_string()).await
}

#[instrument(skip_all, fields(resource = T::KEY))]
pub async fn list_page<T: Resource>(
    State(state): State<AppState>,
    _caller: AuthUser,
    page: Result<Path<u32>, PathRejection>,
    OriginalUri(uri): OriginalUri,
) -> AppResult<Json<Envelope<T::View>>> {
    let page = Page::new(path_value(page)?)?;
    list_in::<T>(&state, page, uri.to_string()).await
}

#[instrument(skip_all, fields(resource = T::KEY))]
pub async fn get_one<T: Resource>(
    State(state): State<AppState>,
    _caller: AuthUser,
    id: Result<Path<i64>, PathRejection>,
    OriginalUri(uri): OriginalUri,
) -> AppResult<Json<Envelope<T::View>>> {
    let id = path_value(id)?;
    let view = present_one::<T>(&state.db, id).await?;
    Ok(Json(Envelope::page(T::KEY, vec![view], Page::FIRST, uri.to_string())))
}

#[instrument(skip_all, fields(resource = T::KEY))]
pub async fn create<T: Resource>(
    State(state): State<AppState>,
    caller: AuthUser,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<T::New>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Envelope<T::View>>)> {
    let Json(new) = payload.map_err(|e| AppError::validation(e.body_text()))?;
    let row = T::insert(&state.db, new).await?;
    let view = T::present(&state.db, vec![row])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("{} vanished after insert", T::NAME)))?;
    info!(resource = T::KEY, user_id = caller.0.id, "created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::single(T::KEY, view, uri.to_string())),
    ))
}

#[instrument(skip_all, fields(resource = T::KEY))]
pub async fn delete_one<T: Resource>(
    State(state): State<AppState>,
    caller: AuthUser,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let id = path_value(id)?;
    T::delete(&state.db, id).await?;
    info!(resource = T::KEY, id, user_id = caller.0.id, "deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip_all, fields(resource = T::KEY))]
pub async fn update_one<T: Resource>(
    State(state): State<AppState>,
    caller: AuthUser,
    id: Result<Path<i64>, PathRejection>,
    OriginalUri(uri): OriginalUri,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> AppResult<Json<Envelope<T::View>>> {
    let id = path_value(id)?;
    let Json(payload) = payload.map_err(|e| AppError::validation(e.body_text()))?;

    if T::find(&state.db, id).await?.is_none() {
        return Err(AppError::not_found(format!("{} {id} does not exist", T::NAME)));
    }
    let plan = UpdatePlan::build(T::NAME, T::UPDATABLE, &payload)?;
    T::update(&state.db, id, plan).await?;

    let view = present_one::<T>(&state.db, id).await?;
    info!(resource = T::KEY, id, user_id = caller.0.id, "updated");
    Ok(Json(Envelope::single(T::KEY, view, uri.to_string())))
}
