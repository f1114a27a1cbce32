//! Search module - marker/keyword search over published content / 搜索模块
//!
//! Architecture principles / 架构原则：
//! - Search only talks to storage through [`ContentIndex`]
//! - Batch search and the interactive controller build a [`QuerySpec`] and
//!   hand it to an index; they never see SQL or HTTP
//! - Call direction: CLI / API → Search → Index (unidirectional) / 调用方向
//!
//! Index backends / 索引实现：
//! - Database index: SQLite storage, LIKE queries on content and title
//! - REST index: the `/api/posts` listing of a running server

pub mod batch;
pub mod controller;
pub mod date_window;
pub mod db_index;
pub mod error;
pub mod index;
pub mod rest_index;
pub mod schema;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::{BatchOutcome, BatchReport, BatchSearcher, ReportCallback};
pub use controller::{ControllerOptions, IncrementalSearchController, DEFAULT_DEBOUNCE};
pub use date_window::{DateWindow, WindowOrigin, DEFAULT_WINDOW_DAYS};
pub use db_index::DbContentIndex;
pub use error::{DateField, SearchError};
pub use index::ContentIndex;
pub use rest_index::RestContentIndex;
pub use schema::{
    ContentItemSummary, Field, Pagination, PostStatus, QuerySpec, QueryTarget, SearchResultPage,
    MAX_PER_PAGE,
};
pub use session::{SearchSession, SessionSnapshot, DEFAULT_PAGE_SIZE};
