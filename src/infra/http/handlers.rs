//! Post and user handlers

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;

use crate::domain::posts::{NewPost, PageQuery, PostPatch};

use super::HttpState;
use super::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

pub async fn create_post(
    State(state): State<HttpState>,
    payload: Result<Json<NewPost>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(input) = payload?;
    input.validate()?;

    let post = state
        .posts
        .create(&input)
        .await
        .map_err(|err| ApiError::service("infra::http::create_post", err))?;

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn list_posts(
    State(state): State<HttpState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(page) = query?;
    page.validate()?;

    let posts = state
        .posts
        .list(page)
        .await
        .map_err(|err| ApiError::service("infra::http::list_posts", err))?;

    Ok(Json(posts))
}

pub async fn search_posts(
    State(state): State<HttpState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(SearchQuery { q }) = query?;

    let posts = state
        .posts
        .search(&q)
        .await
        .map_err(|err| ApiError::service("infra::http::search_posts", err))?;

    Ok(Json(posts))
}

pub async fn get_post(
    State(state): State<HttpState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id?;

    let post = state
        .posts
        .find_one(id)
        .await
        .map_err(|err| ApiError::service("infra::http::get_post", err))?;

    Ok(Json(post))
}

pub async fn update_post(
    State(state): State<HttpState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PostPatch>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    patch.validate()?;

    let post = state
        .posts
        .update(id, &patch)
        .await
        .map_err(|err| ApiError::service("infra::http::update_post", err))?;

    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<HttpState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id?;

    state
        .posts
        .remove(id)
        .await
        .map_err(|err| ApiError::service("infra::http::delete_post", err))?;

    Ok(Json(json!({})))
}

pub async fn get_user(
    State(state): State<HttpState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id?;

    let user = state
        .users
        .find_one(id)
        .await
        .map_err(|err| ApiError::service("infra::http::get_user", err))?;

    Ok(Json(user))
}

pub async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}
