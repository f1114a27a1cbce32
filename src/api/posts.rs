//! Published content listing / 内容列表接口
//!
//! `GET /api/posts` lists summaries with the page count in `X-Total-Pages`
//! (mirrored as `X-WP-TotalPages`); `GET /api/posts/:id` returns one summary.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::api::ApiResponse;
use crate::state::AppState;
use readmore_backend::search::date_window::parse_date;
use readmore_backend::search::rest_index::TOTAL_PAGES_HEADER;
use readmore_backend::search::{
    ContentItemSummary, DateField, DateWindow, Field, PostStatus, QuerySpec, SearchError,
};

/// Header name the original block editor reads / 兼容头
pub const WP_TOTAL_PAGES_HEADER: &str = "x-wp-totalpages";

type ApiError = (StatusCode, Json<ApiResponse<()>>);

fn bad_request(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ApiResponse::error(400, message)))
}

fn search_error(e: SearchError) -> ApiError {
    let status = match &e {
        SearchError::InvalidDateFormat { .. } | SearchError::EmptyMarker => StatusCode::BAD_REQUEST,
        SearchError::IndexUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if e.is_index_error() {
        tracing::warn!("Content query failed: {}", e);
    }
    (status, Json(ApiResponse::error(status.as_u16(), &e.to_string())))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub marker: Option<String>,
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub status: Option<String>,
    pub after: Option<String>,
    pub before: Option<String>,
    #[serde(rename = "_fields")]
    pub fields: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemParams {
    pub status: Option<String>,
    #[serde(rename = "_fields")]
    pub fields: Option<String>,
}

fn check_status(raw: Option<&str>) -> Result<PostStatus, ApiError> {
    match raw {
        None => Ok(PostStatus::Publish),
        Some(s) => s
            .parse()
            .map_err(|_| bad_request("Only published content can be listed")),
    }
}

fn parse_fields(raw: Option<&str>) -> BTreeSet<Field> {
    raw.map(Field::parse_list).unwrap_or_else(Field::all)
}

fn parse_bounded(raw: Option<&str>, name: &str, default: u32, max: u32) -> Result<u32, ApiError> {
    let Some(raw) = raw else { return Ok(default) };
    match raw.trim().parse::<i64>() {
        Ok(n) if n >= 1 && n <= i64::from(max) => Ok(n as u32),
        _ => Err(bad_request(&format!("Invalid parameter: {}", name))),
    }
}

fn parse_window(after: Option<&str>, before: Option<&str>) -> Result<Option<DateWindow>, ApiError> {
    match (after, before) {
        (None, None) => Ok(None),
        (Some(after), Some(before)) => {
            let before = parse_date(before, DateField::Before).map_err(search_error)?;
            let after = parse_date(after, DateField::After).map_err(search_error)?;
            Ok(Some(DateWindow::new(after, before)))
        }
        _ => Err(bad_request("'after' and 'before' must be given together")),
    }
}

/// Summary reduced to the requested `_fields` / 按字段投影
fn project(item: &ContentItemSummary, fields: &BTreeSet<Field>) -> Value {
    let mut object = Map::new();
    for field in fields {
        let value = match field {
            Field::Id => Value::from(item.id),
            Field::Title => Value::from(item.title.clone()),
            Field::Link => Value::from(item.permalink.clone()),
        };
        object.insert(field.as_str().to_string(), value);
    }
    Value::Object(object)
}

/// GET /api/posts - 内容列表
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError> {
    let status = check_status(params.status.as_deref())?;
    let page = parse_bounded(params.page.as_deref(), "page", 1, u32::MAX)?;
    let per_page = parse_bounded(
        params.per_page.as_deref(),
        "per_page",
        state.search.default_page_size,
        state.search.page_size_limit(),
    )?;
    let window = parse_window(params.after.as_deref(), params.before.as_deref())?;
    let fields = parse_fields(params.fields.as_deref());

    let mut spec = match params.marker.as_deref() {
        Some(marker) => QuerySpec::marker(marker).map_err(search_error)?,
        None => QuerySpec::keyword(params.search.as_deref().unwrap_or("")),
    }
    .paged(page, per_page)
    .with_fields(fields.clone());
    spec.status = status;
    if let Some(window) = window {
        spec = spec.within(window);
    }

    let result = state.index.query(&spec).await.map_err(search_error)?;

    let total = HeaderValue::from(result.total_pages);
    let mut headers = HeaderMap::new();
    headers.insert(TOTAL_PAGES_HEADER, total.clone());
    headers.insert(WP_TOTAL_PAGES_HEADER, total);

    let body: Vec<Value> = result.items.iter().map(|item| project(item, &fields)).collect();
    Ok((headers, Json(body)).into_response())
}

/// GET /api/posts/:id - 单条内容
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<ItemParams>,
) -> Result<Json<Value>, ApiError> {
    let status = check_status(params.status.as_deref())?;
    let fields = parse_fields(params.fields.as_deref());

    let mut spec = QuerySpec::identifier(id).with_fields(fields.clone());
    spec.status = status;

    let result = state.index.query(&spec).await.map_err(search_error)?;
    match result.find(id) {
        Some(item) => Ok(Json(project(item, &fields))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(404, &format!("No content with id {}", id))),
        )),
    }
}
