//! HTTP-backed content index / 基于 HTTP 的内容索引
//!
//! Talks to the `/api/posts` listing served by `readmore serve`. The total page
//! count travels in the `X-Total-Pages` response header.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

use super::error::SearchError;
use super::index::ContentIndex;
use super::schema::{
    ContentItemSummary, Field, Pagination, QuerySpec, QueryTarget, SearchResultPage, MAX_PER_PAGE,
};

/// Response header carrying the page count / 总页数响应头
pub const TOTAL_PAGES_HEADER: &str = "x-total-pages";

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            SearchError::IndexUnavailable(e.to_string())
        } else {
            SearchError::IndexQueryError(e.to_string())
        }
    }
}

pub struct RestContentIndex {
    client: Client,
    base: Url,
    /// Largest `per_page` the server accepts / 服务端单页上限
    page_limit: u32,
}

impl RestContentIndex {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, SearchError> {
        let mut base = Url::parse(endpoint)
            .map_err(|e| {
                SearchError::IndexUnavailable(format!("invalid endpoint {}: {}", endpoint, e))
            })?;
        // join() replaces the last segment unless the path ends with '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                SearchError::IndexUnavailable(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base,
            page_limit: MAX_PER_PAGE,
        })
    }

    /// Match the server's `search.max_page_size` / 设置单页上限
    pub fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit.clamp(1, MAX_PER_PAGE);
        self
    }

    /// Build the request URL for one page of `spec` / 构建请求地址
    pub fn request_url(
        &self,
        spec: &QuerySpec,
        page: Option<(u32, u32)>,
    ) -> Result<Url, SearchError> {
        let path = match spec.target {
            QueryTarget::Identifier(id) => format!("api/posts/{}", id),
            _ => "api/posts".to_string(),
        };
        let mut url = self
            .base
            .join(&path)
            .map_err(|e| SearchError::IndexQueryError(e.to_string()))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("status", spec.status.as_str());
            pairs.append_pair("_fields", &Field::join(&spec.fields));
            match &spec.target {
                QueryTarget::Marker(marker) => {
                    pairs.append_pair("marker", marker);
                }
                QueryTarget::Keyword(keyword) if !keyword.is_empty() => {
                    pairs.append_pair("search", keyword);
                }
                _ => {}
            }
            if let Some(window) = &spec.date_window {
                pairs.append_pair("after", &window.after_str());
                pairs.append_pair("before", &window.before_str());
            }
            if let Some((page, per_page)) = page {
                pairs.append_pair("page", &page.to_string());
                pairs.append_pair("per_page", &per_page.to_string());
            }
        }
        Ok(url)
    }

    async fn fetch(&self, url: Url, single: bool) -> Result<SearchResultPage, SearchError> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if single && status == StatusCode::NOT_FOUND {
            return Ok(SearchResultPage::empty());
        }
        if status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(SearchError::IndexUnavailable(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(SearchError::IndexQueryError(format!("HTTP {}", status)));
        }

        let header_pages = response
            .headers()
            .get(TOTAL_PAGES_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u32>().ok());

        let body: serde_json::Value = response.json().await?;
        let decode_error = |e: serde_json::Error| SearchError::IndexQueryError(e.to_string());
        let items: Vec<ContentItemSummary> = if body.is_array() {
            serde_json::from_value(body).map_err(decode_error)?
        } else {
            vec![serde_json::from_value(body).map_err(decode_error)?]
        };

        let total_pages = header_pages.unwrap_or_else(|| u32::from(!items.is_empty()));
        Ok(SearchResultPage { items, total_pages })
    }
}

#[async_trait]
impl ContentIndex for RestContentIndex {
    async fn query(&self, spec: &QuerySpec) -> Result<SearchResultPage, SearchError> {
        match spec.pagination {
            None => {
                let url = self.request_url(spec, None)?;
                self.fetch(url, true).await
            }
            Some(Pagination::Paged { page, per_page }) => {
                let url = self.request_url(spec, Some((page, per_page)))?;
                self.fetch(url, false).await
            }
            Some(Pagination::Unbounded) => {
                // The API caps page size, so walk every page
                let mut items = Vec::new();
                let mut page = 1;
                loop {
                    let url = self.request_url(spec, Some((page, self.page_limit)))?;
                    let chunk = self.fetch(url, false).await?;
                    items.extend(chunk.items);
                    if page >= chunk.total_pages {
                        break;
                    }
                    page += 1;
                }
                Ok(SearchResultPage {
                    total_pages: u32::from(!items.is_empty()),
                    items,
                })
            }
        }
    }

    fn name(&self) -> &str {
        "rest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, HeaderValue, StatusCode as AxumStatus};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;

    async fn list(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
        let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
        let per_page: u32 = params.get("per_page").and_then(|p| p.parse().ok()).unwrap_or(10);
        if params.get("marker").map(String::as_str) == Some("capped") && per_page > 20 {
            let body = Json(serde_json::json!({"message": "Invalid parameter: per_page"}));
            return (AxumStatus::BAD_REQUEST, HeaderMap::new(), body);
        }
        if params.get("search").map(String::as_str) == Some("broken") {
            let body = Json(serde_json::json!([]));
            return (AxumStatus::INTERNAL_SERVER_ERROR, HeaderMap::new(), body);
        }
        let items = vec![
            ContentItemSummary::new(i64::from(page) * 10, format!("page {}", page), "/x"),
            ContentItemSummary::new(i64::from(page) * 10 + 1, "second", "/y"),
        ];
        let mut headers = HeaderMap::new();
        headers.insert(TOTAL_PAGES_HEADER, HeaderValue::from_static("3"));
        (AxumStatus::OK, headers, Json(serde_json::to_value(items).unwrap()))
    }

    async fn single(Path(id): Path<i64>) -> impl IntoResponse {
        if id == 404 {
            return (AxumStatus::NOT_FOUND, Json(serde_json::json!({"message": "not found"})));
        }
        let item = ContentItemSummary::new(id, "Found", "/found");
        (AxumStatus::OK, Json(serde_json::to_value(item).unwrap()))
    }

    async fn serve() -> String {
        let app = Router::new()
            .route("/api/posts", get(list))
            .route("/api/posts/:id", get(single));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn index(endpoint: &str) -> RestContentIndex {
        RestContentIndex::new(endpoint, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_request_url_for_keyword() {
        let idx = index("http://example.test/base");
        let spec = QuerySpec::keyword("budget report").paged(2, 20);
        let url = idx.request_url(&spec, Some((2, 20))).unwrap();
        assert_eq!(url.path(), "/base/api/posts");
        let query = url.query().unwrap();
        assert!(query.contains("search=budget+report"));
        assert!(query.contains("page=2"));
        assert!(query.contains("per_page=20"));
        assert!(query.contains("_fields=id%2Ctitle%2Clink"));
    }

    #[test]
    fn test_request_url_for_identifier_has_no_paging() {
        let idx = index("http://example.test");
        let url = idx.request_url(&QuerySpec::identifier(42), None).unwrap();
        assert_eq!(url.path(), "/api/posts/42");
        assert!(!url.query().unwrap().contains("page"));
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(matches!(
            RestContentIndex::new("not a url", Duration::from_secs(1)),
            Err(SearchError::IndexUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_paged_query_reads_total_pages_header() {
        let endpoint = serve().await;
        let page = index(&endpoint).query(&QuerySpec::keyword("x").paged(2, 2)).await.unwrap();
        assert_eq!(page.ids(), vec![20, 21]);
        assert_eq!(page.total_pages, 3);
    }

    #[tokio::test]
    async fn test_unbounded_query_walks_all_pages() {
        let endpoint = serve().await;
        let page = index(&endpoint).query(&QuerySpec::marker("m").unwrap()).await.unwrap();
        assert_eq!(page.ids(), vec![10, 11, 20, 21, 30, 31]);
        assert_eq!(page.total_pages, 1);
    }

    #[tokio::test]
    async fn test_unbounded_walk_respects_page_limit() {
        let endpoint = serve().await;
        let spec = QuerySpec::marker("capped").unwrap();

        let err = index(&endpoint).query(&spec).await.unwrap_err();
        assert!(matches!(err, SearchError::IndexQueryError(_)), "{err:?}");

        let page = index(&endpoint).with_page_limit(20).query(&spec).await.unwrap();
        assert_eq!(page.ids(), vec![10, 11, 20, 21, 30, 31]);
    }

    #[test]
    fn test_page_limit_is_clamped() {
        assert_eq!(index("http://example.test").with_page_limit(0).page_limit, 1);
        assert_eq!(index("http://example.test").with_page_limit(500).page_limit, MAX_PER_PAGE);
    }

    #[tokio::test]
    async fn test_identifier_lookup_and_not_found() {
        let endpoint = serve().await;
        let idx = index(&endpoint);
        let page = idx.query(&QuerySpec::identifier(7)).await.unwrap();
        assert_eq!(page.ids(), vec![7]);
        assert_eq!(page.total_pages, 1);

        let page = idx.query(&QuerySpec::identifier(404)).await.unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_is_query_error() {
        let endpoint = serve().await;
        let err = index(&endpoint).query(&QuerySpec::keyword("broken")).await.unwrap_err();
        assert!(matches!(err, SearchError::IndexQueryError(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unavailable() {
        // Bind then drop to get a port nobody listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = index(&format!("http://{}", addr))
            .query(&QuerySpec::identifier(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::IndexUnavailable(_)), "{err:?}");
    }
}
