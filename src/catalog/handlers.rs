use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::{debug, instrument};

use super::dto::{Facets, SearchQuery, SearchResponse};
use super::repo::{self, Supplement};
use super::services::{self, SearchFilter};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/supplements", get(search_supplements))
        .route("/supplements/facets", get(get_facets))
        .route("/supplements/recommended", get(get_recommended))
        .route("/supplements/:id", get(get_supplement))
}

#[instrument(skip(state))]
pub async fn search_supplements(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<SearchResponse>> {
    let filter = SearchFilter::from(query);
    let catalog = repo::list_all(&state.db).await?;
    let items = services::search(catalog, &filter);
    debug!(filtered = filter.is_active(), hits = items.len(), "catalog search");
    Ok(Json(SearchResponse {
        filtered: filter.is_active(),
        total: items.len(),
        items,
    }))
}

#[instrument(skip(state))]
pub async fn get_facets(State(state): State<AppState>) -> AppResult<Json<Facets>> {
    let catalog = repo::list_all(&state.db).await?;
    Ok(Json(services::facets(&catalog)))
}

#[instrument(skip(state))]
pub async fn get_recommended(State(state): State<AppState>) -> AppResult<Json<Vec<Supplement>>> {
    let catalog = repo::list_all(&state.db).await?;
    let picks = services::recommend(catalog, &mut rand::thread_rng());
    Ok(Json(picks))
}

#[instrument(skip(state))]
pub async fn get_supplement(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Supplement>> {
    repo::find(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("supplement {} not found", id)))
}
