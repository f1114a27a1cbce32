//! Batch marker search / 批量标记搜索
//!
//! Enumerates every published item containing the marker inside a date
//! window with exactly one index call, and reports what it found.

use chrono::{Local, NaiveDate};
use std::fmt;
use std::sync::Arc;

use super::date_window::{DateWindow, WindowOrigin, DEFAULT_WINDOW_DAYS};
use super::error::SearchError;
use super::index::ContentIndex;
use super::schema::QuerySpec;

/// Caller-observable outcome of a batch run / 批量搜索报告
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchReport {
    /// Informational, emitted before the index call
    Searching {
        marker: String,
        window: DateWindow,
        origin: WindowOrigin,
    },
    /// Informational, not an error
    NoMatches { marker: String },
    /// Identifiers in the index's native order
    Matches { ids: Vec<i64> },
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchReport::Searching { marker, window, origin: WindowOrigin::Supplied } => write!(
                f,
                "Searching posts containing '{}' block between {} && {} ...",
                marker,
                window.after_str(),
                window.before_str()
            ),
            BatchReport::Searching { marker, window, origin: WindowOrigin::Defaulted } => write!(
                f,
                "Searching posts containing '{}' block defaulting to the last {} days ({}) ...",
                marker,
                (window.before() - window.after()).num_days(),
                window
            ),
            BatchReport::NoMatches { marker } => {
                write!(f, "No posts found containing '{}' block", marker)
            }
            BatchReport::Matches { ids } => {
                let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
                write!(f, "Matching post IDs: {}", ids.join(","))
            }
        }
    }
}

/// Report callback type / 报告回调类型
pub type ReportCallback = Arc<dyn Fn(&BatchReport) + Send + Sync>;

/// Result of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub window: DateWindow,
    pub ids: Vec<i64>,
}

pub struct BatchSearcher {
    index: Arc<dyn ContentIndex>,
    marker: String,
    window_days: i64,
    on_report: Option<ReportCallback>,
}

impl BatchSearcher {
    pub fn new(index: Arc<dyn ContentIndex>, marker: impl Into<String>) -> Self {
        Self {
            index,
            marker: marker.into(),
            window_days: DEFAULT_WINDOW_DAYS,
            on_report: None,
        }
    }

    /// Length of the default window when dates are omitted
    pub fn with_window_days(mut self, days: i64) -> Self {
        self.window_days = days;
        self
    }

    pub fn on_report(mut self, callback: ReportCallback) -> Self {
        self.on_report = Some(callback);
        self
    }

    fn report(&self, report: BatchReport) {
        tracing::info!("{}", report);
        if let Some(cb) = &self.on_report {
            cb(&report);
        }
    }

    /// Run against today's local date
    pub async fn run(
        &self,
        raw_after: Option<&str>,
        raw_before: Option<&str>,
    ) -> Result<BatchOutcome, SearchError> {
        self.run_on(raw_after, raw_before, Local::now().date_naive()).await
    }

    /// Run with an explicit "today" for the defaulted window
    pub async fn run_on(
        &self,
        raw_after: Option<&str>,
        raw_before: Option<&str>,
        today: NaiveDate,
    ) -> Result<BatchOutcome, SearchError> {
        // Validation happens before any index call
        let (window, origin) = DateWindow::resolve(raw_after, raw_before, today, self.window_days)?;
        let spec = QuerySpec::marker(&self.marker)?.within(window);

        self.report(BatchReport::Searching {
            marker: self.marker.clone(),
            window,
            origin,
        });

        let page = self.index.query(&spec).await.map_err(|e| {
            tracing::warn!("Batch search on {} index failed: {}", self.index.name(), e);
            e
        })?;

        let ids = page.ids();
        if ids.is_empty() {
            self.report(BatchReport::NoMatches { marker: self.marker.clone() });
        } else {
            self.report(BatchReport::Matches { ids: ids.clone() });
        }

        Ok(BatchOutcome { window, ids })
    }
}
