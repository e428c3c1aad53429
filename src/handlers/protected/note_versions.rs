use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Deserialize;

use super::page;
use crate::auth::Principal;
use crate::filter::SortDirection;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{NoteVersion, CREATED_AT_COLUMN};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionQuery {
    pub note_id: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

/// GET /note-versions?noteId=&limit=&offset= - with `noteId`, that note's
/// history newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<VersionQuery>,
) -> ApiResult<Vec<NoteVersion>> {
    let mut filter = page(query.limit.as_deref(), query.offset.as_deref(), &state.config.api)?;
    if let Some(note_id) = query.note_id.filter(|n| !n.is_empty()) {
        filter = filter.eq("note_id", note_id).order_by(CREATED_AT_COLUMN, SortDirection::Desc);
    }

    let versions = state.repository::<NoteVersion>().list(&principal, filter).await?;
    Ok(ApiResponse::success(versions))
}
