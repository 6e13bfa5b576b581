//! # Handlers
//!
//! This module coordinates the flow between HTTP requests and the services.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domains::{ActorId, MovieFilter, MovieId, NewReview};
use serde::Deserialize;

use crate::error::ApiError;
use crate::visitor::VisitorIp;
use crate::AppState;

type ApiResult<T> = Result<T, ApiError>;

/// Query string of `GET /movies`; `genres` is a comma-separated list of titles.
#[derive(Debug, Default, Deserialize)]
pub struct MovieQuery {
    pub year_min: Option<i16>,
    pub year_max: Option<i16>,
    pub genres: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl From<MovieQuery> for MovieFilter {
    fn from(query: MovieQuery) -> Self {
        let genres = query
            .genres
            .as_deref()
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|genre| !genre.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        MovieFilter {
            year_min: query.year_min,
            year_max: query.year_max,
            genres,
            limit: query.limit,
            offset: query.offset,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RatingBody {
    pub star: i16,
    pub movie: MovieId,
}

pub async fn list_movies(
    State(state): State<AppState>,
    VisitorIp(ip): VisitorIp,
    query: Result<Query<MovieQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query?;
    let filter = MovieFilter::from(query);
    let movies = state.movies.list(&filter, &ip).await?;
    Ok(Json(movies))
}

pub async fn movie_detail(
    State(state): State<AppState>,
    id: Result<Path<MovieId>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id?;
    Ok(Json(state.movies.detail(id).await?))
}

pub async fn movie_rating(
    State(state): State<AppState>,
    VisitorIp(ip): VisitorIp,
    id: Result<Path<MovieId>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id?;
    Ok(Json(state.ratings.aggregate(id, &ip).await?))
}

pub async fn create_review(
    State(state): State<AppState>,
    body: Result<Json<NewReview>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    let review = state.reviews.submit(body).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// Records the caller's star; repeated calls from one address overwrite it.
pub async fn create_rating(
    State(state): State<AppState>,
    VisitorIp(ip): VisitorIp,
    body: Result<Json<RatingBody>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(body) = body?;
    let rating = state.ratings.rate(body.movie, &ip, body.star).await?;
    Ok((StatusCode::CREATED, Json(rating)))
}

pub async fn list_actors(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.actors.list().await?))
}

pub async fn actor_detail(
    State(state): State<AppState>,
    id: Result<Path<ActorId>, PathRejection>,
) -> ApiResult<impl IntoResponse> {
    let Path(id) = id?;
    Ok(Json(state.actors.detail(id).await?))
}

pub async fn health() -> &'static str {
    "ok"
}
