//! CRUD handlers shared by tasks, pomodoro sessions and prompts.

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{page, parse_id};
use crate::auth::Principal;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{Patchable, Resource};
use crate::state::AppState;
use crate::validation::ValidatedJson;

/// Query string of list routes. Unknown parameters (including any attempt
/// at `userId`) are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// GET /{resources}
pub async fn list<R: Resource>(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<R>> {
    let filter = page(query.limit.as_deref(), query.offset.as_deref(), &state.config.api)?;
    let items = state.repository::<R>().list(&principal, filter).await?;
    Ok(ApiResponse::success(items))
}

/// POST /{resources}
pub async fn create<R: Resource>(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(input): ValidatedJson<R::New>,
) -> ApiResult<R> {
    let created = state.repository::<R>().create(&principal, input).await?;
    tracing::info!(table = R::TABLE, resource_id = %created.id(), principal = %principal.id(), "Created");
    Ok(ApiResponse::created(created))
}

/// GET /{resources}/:id
pub async fn get<R: Resource>(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<R> {
    let id = parse_id::<R>(&id)?;
    let item = state.repository::<R>().get(&principal, id).await?;
    Ok(ApiResponse::success(item))
}

/// PATCH /{resources}/:id
pub async fn update<R: Patchable>(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ValidatedJson(patch): ValidatedJson<R::Patch>,
) -> ApiResult<R> {
    let id = parse_id::<R>(&id)?;
    let updated = state.repository::<R>().update(&principal, id, patch).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /{resources}/:id
pub async fn delete<R: Resource>(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_id::<R>(&id)?;
    state.repository::<R>().delete(&principal, id).await?;
    tracing::info!(table = R::TABLE, resource_id = %id, principal = %principal.id(), "Deleted");
    Ok(ApiResponse::success(json!({ "deleted": true, "id": id })))
}
