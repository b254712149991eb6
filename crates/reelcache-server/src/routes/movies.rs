//! Movie lookup routes. Each one is cache-aside over OMDb.

use crate::{
    error::{ApiError, ApiResult},
    response::ApiResponse,
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use reelcache_cache::keys;
use reelcache_omdb::{MovieDetails, SearchQuery, SearchResults};
use serde::Deserialize;

const DEFAULT_PLOT: &str = "full";

/// Create the `/movies` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search", get(search))
        .route("/title/:title", get(by_title))
        .route("/:id", get(by_id))
}

/// Query parameters for `/movies/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    title: Option<String>,
    page: Option<String>,
    year: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Query parameters for the detail routes.
#[derive(Debug, Deserialize)]
pub struct DetailParams {
    year: Option<String>,
    plot: Option<String>,
}

/// An empty value counts as absent. Values are otherwise used exactly as
/// sent, so the cache key matches what OMDb is asked for.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn plot_or_default(plot: Option<String>) -> String {
    plot.unwrap_or_else(|| DEFAULT_PLOT.to_string())
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<ApiResponse<SearchResults>>> {
    let title = non_empty(params.title)
        .ok_or_else(|| ApiError::BadRequest("Title parameter is required".into()))?;

    let mut query = SearchQuery::new(title);
    if let Some(page) = params.page {
        query = query.page(page);
    }
    query.year = non_empty(params.year);
    query.kind = non_empty(params.kind);

    let key = keys::search(
        &query.title,
        &query.page,
        query.year.as_deref(),
        query.kind.as_deref(),
    );

    let lookup = state
        .cache
        .get_or_fetch(&key, || state.omdb.search(&query))
        .await?;

    Ok(Json(lookup.into()))
}

async fn by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<DetailParams>,
) -> ApiResult<Json<ApiResponse<MovieDetails>>> {
    let id = non_empty(Some(id)).ok_or_else(|| ApiError::BadRequest("Movie ID is required".into()))?;
    let plot = plot_or_default(params.plot);

    let key = keys::movie(&id, &plot);

    let lookup = state
        .cache
        .get_or_fetch(&key, || state.omdb.movie_by_id(&id, &plot))
        .await?;

    Ok(Json(lookup.into()))
}

async fn by_title(
    State(state): State<AppState>,
    Path(title): Path<String>,
    Query(params): Query<DetailParams>,
) -> ApiResult<Json<ApiResponse<MovieDetails>>> {
    let title = non_empty(Some(title))
        .ok_or_else(|| ApiError::BadRequest("Movie title is required".into()))?;
    let year = non_empty(params.year);
    let plot = plot_or_default(params.plot);

    let key = keys::title(&title, year.as_deref(), &plot);

    let lookup = state
        .cache
        .get_or_fetch(&key, || state.omdb.movie_by_title(&title, year.as_deref(), &plot))
        .await?;

    Ok(Json(lookup.into()))
}
