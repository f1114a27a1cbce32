//! Search request and result schema / 搜索请求与结果的 Schema 定义

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::date_window::DateWindow;
use super::error::SearchError;
use crate::utils::escape_html;

/// Largest page a paged query may request / 每页最大条数
pub const MAX_PER_PAGE: u32 = 100;

/// Projectable summary fields / 可投影字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Id,
    Title,
    Link,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Title => "title",
            Field::Link => "link",
        }
    }

    /// Every projectable field
    pub fn all() -> BTreeSet<Field> {
        [Field::Id, Field::Title, Field::Link].into_iter().collect()
    }

    /// Parse a `_fields=id,title,link` list, ignoring unknown names.
    /// An empty or unusable list means every field.
    pub fn parse_list(raw: &str) -> BTreeSet<Field> {
        let fields: BTreeSet<Field> = raw
            .split(',')
            .filter_map(|name| name.trim().parse().ok())
            .collect();
        if fields.is_empty() {
            Self::all()
        } else {
            fields
        }
    }

    /// Render a set back to `id,title,link` form
    pub fn join(fields: &BTreeSet<Field>) -> String {
        fields.iter().map(Field::as_str).collect::<Vec<_>>().join(",")
    }
}

impl FromStr for Field {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Field::Id),
            "title" => Ok(Field::Title),
            "link" => Ok(Field::Link),
            _ => Err(()),
        }
    }
}

/// Publication status filter; only published content is ever searched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Publish,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Publish => "publish",
        }
    }
}

impl FromStr for PostStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "publish" => Ok(PostStatus::Publish),
            _ => Err(()),
        }
    }
}

/// What a query matches against / 查询目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryTarget {
    /// Fixed token searched in item content
    Marker(String),
    /// Free text searched in title and content; empty matches everything
    Keyword(String),
    /// Direct lookup of a single item
    Identifier(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// Every match in one logical pass
    Unbounded,
    /// `page >= 1`, `per_page` in `1..=MAX_PER_PAGE`
    Paged { page: u32, per_page: u32 },
}

impl Pagination {
    pub fn paged(page: u32, per_page: u32) -> Self {
        Pagination::Paged {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }
}

/// Normalized search request / 规范化的搜索请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub target: QueryTarget,
    pub date_window: Option<DateWindow>,
    pub status: PostStatus,
    /// `None` only for identifier lookups
    pub pagination: Option<Pagination>,
    pub fields: BTreeSet<Field>,
}

impl QuerySpec {
    /// Unbounded marker enumeration projecting ids only
    pub fn marker(marker: &str) -> Result<Self, SearchError> {
        let marker = marker.trim();
        if marker.is_empty() {
            return Err(SearchError::EmptyMarker);
        }
        Ok(Self {
            target: QueryTarget::Marker(marker.to_string()),
            date_window: None,
            status: PostStatus::Publish,
            pagination: Some(Pagination::Unbounded),
            fields: [Field::Id].into_iter().collect(),
        })
    }

    /// Keyword search, first page of ten until [`QuerySpec::paged`] says otherwise
    pub fn keyword(keyword: &str) -> Self {
        Self {
            target: QueryTarget::Keyword(keyword.trim().to_string()),
            date_window: None,
            status: PostStatus::Publish,
            pagination: Some(Pagination::paged(1, 10)),
            fields: Field::all(),
        }
    }

    /// Single item lookup; pagination is meaningless here and left out
    pub fn identifier(id: i64) -> Self {
        Self {
            target: QueryTarget::Identifier(id),
            date_window: None,
            status: PostStatus::Publish,
            pagination: None,
            fields: Field::all(),
        }
    }

    pub fn within(mut self, window: DateWindow) -> Self {
        self.date_window = Some(window);
        self
    }

    /// Set the page; ignored for identifier lookups
    pub fn paged(mut self, page: u32, per_page: u32) -> Self {
        if !matches!(self.target, QueryTarget::Identifier(_)) {
            self.pagination = Some(Pagination::paged(page, per_page));
        }
        self
    }

    pub fn with_fields(mut self, fields: BTreeSet<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn wants(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }
}

/// Item summary produced by a content index / 内容条目摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItemSummary {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "link", default)]
    pub permalink: String,
}

impl ContentItemSummary {
    pub fn new(id: i64, title: impl Into<String>, permalink: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            permalink: permalink.into(),
        }
    }

    /// Anchor markup for the selected read-more target / 生成 Read More 链接
    pub fn read_more_html(&self) -> String {
        format!(
            "Read More: <a href=\"{}\" class=\"read-more\">{}</a>",
            escape_html(&self.permalink),
            escape_html(&self.title)
        )
    }
}

impl fmt::Display for ContentItemSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.id, self.title)
    }
}

/// One page of results, always replaced as a whole / 搜索结果页
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchResultPage {
    pub items: Vec<ContentItemSummary>,
    pub total_pages: u32,
}

impl SearchResultPage {
    pub fn new(items: Vec<ContentItemSummary>, total_pages: u32) -> Self {
        Self { items, total_pages }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Identifiers in index order
    pub fn ids(&self) -> Vec<i64> {
        self.items.iter().map(|item| item.id).collect()
    }

    pub fn find(&self, id: i64) -> Option<&ContentItemSummary> {
        self.items.iter().find(|item| item.id == id)
    }
}

/// Pages needed for `count` matches at `per_page` / 计算总页数
pub fn total_pages_for(count: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    let pages = count.div_ceil(u64::from(per_page));
    u32::try_from(pages).unwrap_or(u32::MAX)
}
