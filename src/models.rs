use serde::{Deserialize, Serialize};

use crate::search::PostStatus;

/// A row of the content store / 内容条目
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContentItem {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub permalink: String,
    pub status: String,
    /// `YYYY-MM-DD HH:MM:SS`
    pub published_at: String,
}

impl ContentItem {
    /// Published item with the given body / 创建已发布条目
    pub fn published(id: i64, title: &str, content: &str, published_at: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            content: content.to_string(),
            permalink: format!("/?p={}", id),
            status: PostStatus::Publish.as_str().to_string(),
            published_at: published_at.to_string(),
        }
    }

    pub fn with_status(mut self, status: &str) -> Self {
        self.status = status.to_string();
        self
    }
}
