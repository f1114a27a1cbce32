//! Content index collaborator / 内容索引接口
//!
//! The core never reaches a content store directly. Everything goes through
//! [`ContentIndex::query`], which keeps the search logic testable with a fake.

use async_trait::async_trait;

use super::error::SearchError;
use super::schema::{QuerySpec, SearchResultPage};

/// Executes a [`QuerySpec`] against some content store.
///
/// Implementations fail with `IndexUnavailable` when the store cannot be
/// reached and `IndexQueryError` when the query itself fails. Result order is
/// the store's native order; callers must not assume ids are sorted.
#[async_trait]
pub trait ContentIndex: Send + Sync {
    async fn query(&self, spec: &QuerySpec) -> Result<SearchResultPage, SearchError>;

    /// Short name used in logs
    fn name(&self) -> &str;
}
