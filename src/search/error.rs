//! Search error taxonomy / 搜索错误类型

use std::fmt;
use thiserror::Error;

/// Which caller-supplied date failed validation / 校验失败的日期字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    After,
    Before,
}

impl DateField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateField::After => "date-after",
            DateField::Before => "date-before",
        }
    }
}

impl fmt::Display for DateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// Malformed user date, raised before any index call / 日期格式错误
    #[error("Invalid '{field}': Please use YYYY-MM-DD format.")]
    InvalidDateFormat { field: DateField },

    #[error("search marker must not be empty")]
    EmptyMarker,

    /// The content index could not be reached / 索引不可用
    #[error("content index unavailable: {0}")]
    IndexUnavailable(String),

    /// The content index rejected or failed the query / 索引查询失败
    #[error("content index query failed: {0}")]
    IndexQueryError(String),

    /// Selected id is not part of the current result set / 选择的条目不在当前结果中
    #[error("no item with id {0} in the current results")]
    SelectionNotFound(i64),

    #[error("search controller has shut down")]
    ControllerClosed,
}

impl SearchError {
    /// Whether the error came from the content index collaborator
    pub fn is_index_error(&self) -> bool {
        matches!(self, SearchError::IndexUnavailable(_) | SearchError::IndexQueryError(_))
    }
}
