//! SQLite-backed content index / 数据库内容索引
//!
//! - Marker targets match item content only (LIKE, wildcards escaped)
//! - Keyword targets match title or content; an empty keyword lists everything
//! - Identifier targets match the primary key
//! - Newest first: `published_at DESC, id DESC`

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, QueryBuilder, Sqlite};

use super::date_window::DateWindow;
use super::error::SearchError;
use super::index::ContentIndex;
use super::schema::{
    total_pages_for, ContentItemSummary, Field, Pagination, QuerySpec, QueryTarget,
    SearchResultPage,
};
use crate::models::ContentItem;
use crate::utils::escape_like;

impl From<sqlx::Error> for SearchError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                SearchError::IndexUnavailable(e.to_string())
            }
            _ => SearchError::IndexQueryError(e.to_string()),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: i64,
    title: String,
    permalink: String,
}

/// Content index over the `content_items` table / 数据库内容索引
pub struct DbContentIndex {
    db: Pool<Sqlite>,
}

impl DbContentIndex {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// Open the database at `url` and apply migrations / 连接数据库并迁移
    pub async fn connect(url: &str) -> Result<Self, SearchError> {
        let db = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(url)
            .await
            .map_err(|e| SearchError::IndexUnavailable(e.to_string()))?;

        crate::db::run_migrations(&db)
            .await
            .map_err(|e| SearchError::IndexUnavailable(e.to_string()))?;

        tracing::info!("Content index opened: {}", url);
        Ok(Self { db })
    }

    /// 关闭数据库连接池 / Close database connection pool
    pub async fn close(&self) {
        self.db.close().await;
    }

    /// Insert or replace one item / 写入条目
    pub async fn upsert(&self, item: &ContentItem) -> Result<(), SearchError> {
        sqlx::query(
            "INSERT OR REPLACE INTO content_items (id, title, content, permalink, status, published_at) VALUES (?, ?, ?, ?, ?, ?)"
        )
        .bind(item.id)
        .bind(&item.title)
        .bind(&item.content)
        .bind(&item.permalink)
        .bind(&item.status)
        .bind(&item.published_at)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    /// Append the shared WHERE clause / 拼接过滤条件
    fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, spec: &QuerySpec) {
        qb.push(" WHERE status = ");
        qb.push_bind(spec.status.as_str().to_string());

        match &spec.target {
            QueryTarget::Marker(marker) => {
                qb.push(" AND content LIKE ");
                qb.push_bind(format!("%{}%", escape_like(marker)));
                qb.push(" ESCAPE '\\'");
            }
            QueryTarget::Keyword(keyword) if !keyword.is_empty() => {
                let pattern = format!("%{}%", escape_like(keyword));
                qb.push(" AND (title LIKE ");
                qb.push_bind(pattern.clone());
                qb.push(" ESCAPE '\\' OR content LIKE ");
                qb.push_bind(pattern);
                qb.push(" ESCAPE '\\')");
            }
            QueryTarget::Keyword(_) => {}
            QueryTarget::Identifier(id) => {
                qb.push(" AND id = ");
                qb.push_bind(*id);
            }
        }

        if let Some(window) = &spec.date_window {
            Self::push_window(qb, window);
        }
    }

    fn push_window(qb: &mut QueryBuilder<'_, Sqlite>, window: &DateWindow) {
        qb.push(" AND date(published_at) BETWEEN ");
        qb.push_bind(window.after_str());
        qb.push(" AND ");
        qb.push_bind(window.before_str());
    }

    async fn count(&self, spec: &QuerySpec) -> Result<u64, SearchError> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM content_items");
        Self::push_filters(&mut qb, spec);
        let count: i64 = qb.build_query_scalar().fetch_one(&self.db).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

#[async_trait]
impl ContentIndex for DbContentIndex {
    async fn query(&self, spec: &QuerySpec) -> Result<SearchResultPage, SearchError> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT id, title, permalink FROM content_items");
        Self::push_filters(&mut qb, spec);
        qb.push(" ORDER BY published_at DESC, id DESC");

        if let Some(Pagination::Paged { page, per_page }) = spec.pagination {
            let offset = i64::from(page.saturating_sub(1)) * i64::from(per_page);
            qb.push(" LIMIT ");
            qb.push_bind(i64::from(per_page));
            qb.push(" OFFSET ");
            qb.push_bind(offset);
        }

        let rows: Vec<SummaryRow> = qb.build_query_as().fetch_all(&self.db).await?;

        let items: Vec<ContentItemSummary> = rows
            .into_iter()
            .map(|row| ContentItemSummary {
                id: row.id,
                title: if spec.wants(Field::Title) { row.title } else { String::new() },
                permalink: if spec.wants(Field::Link) { row.permalink } else { String::new() },
            })
            .collect();

        let total_pages = match spec.pagination {
            Some(Pagination::Paged { per_page, .. }) => {
                total_pages_for(self.count(spec).await?, per_page)
            }
            // Everything fits on the single logical page
            _ => u32::from(!items.is_empty()),
        };

        tracing::debug!(
            "Content index query {:?} -> {} items, {} pages",
            spec.target,
            items.len(),
            total_pages
        );
        Ok(SearchResultPage { items, total_pages })
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
