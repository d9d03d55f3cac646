use axum::{
    Json,
    extract::{MatchedPath, Query, State},
};
use serde::Deserialize;
use crate::api::AppState;
use crate::api::fields::{SongList, SongView};
use crate::core::error::{Error, Result};
use crate::search::cursor::continuation_uri;
use crate::search::filter::SongFilter;

/// Raw query string of a listing. Values are validated by hand so malformed
/// ones surface as `{message}` bodies.
#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub previous_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub word: Option<String>,
}

pub fn parse_limit(raw: Option<&str>, default: usize) -> Result<usize> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(default),
        Some(raw) => raw.parse::<usize>().map_err(|_| {
            Error::validation(format!("limit must be a non-negative integer, got '{}'", raw))
        }),
    }
}

/// Serves both `/songs` and `/songs/search`; the continuation link points back
/// at whichever route was hit.
pub async fn list_songs(
    State(state): State<AppState>,
    path: MatchedPath,
    Query(params): Query<ListParams>,
) -> Result<Json<SongList>> {
    let limit = state.pager.clamp_limit(parse_limit(params.limit.as_deref(), state.default_page_size)?);
    let previous_id = params.previous_id.as_deref().filter(|id| !id.is_empty());
    let filter = SongFilter::new(params.message, params.word);

    let page = state.pager.list(previous_id, limit, &filter)?;
    let next = continuation_uri(path.as_str(), &page, limit, &filter);

    Ok(Json(SongList {
        data: page.items.into_iter().map(SongView::from).collect(),
        next,
    }))
}
