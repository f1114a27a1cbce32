//! Interactive search session state / 交互式搜索会话状态
//!
//! Pure state machine behind the incremental search controller:
//!
//! - Idle -> Debouncing on any keyword/page/page-size change
//! - Debouncing -> Querying when the debounce timer fires
//! - Querying -> Idle when the response carrying the current token arrives
//!
//! Every edit voids the in-flight token, so a response to a superseded query
//! is recognised by its token and dropped. Timing lives in the controller.

use super::error::SearchError;
use super::schema::{ContentItemSummary, QuerySpec, SearchResultPage, MAX_PER_PAGE};
use crate::utils::{parse_identifier, parse_leading_int};

/// Page size before the user picks one / 默认每页条数
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Tags one dispatched query / 请求令牌
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Debouncing,
    Querying(RequestToken),
}

/// What a fired timer asks the driver to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Empty keyword: the default result was restored, no index call
    Reset,
    /// Run `spec` and hand the answer back with `token`
    Query { token: RequestToken, spec: QuerySpec },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    Applied,
    /// Current query failed; the previous result is still shown
    Failed(SearchError),
    /// Answer to a superseded query, discarded
    Stale,
}

/// Readable view of a session / 会话快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub keyword: String,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub items: Vec<ContentItemSummary>,
    pub loading: bool,
    pub selected: Option<ContentItemSummary>,
    pub last_error: Option<SearchError>,
}

/// Clamp a raw page value to `1..=total_pages` / 限制页码范围
///
/// Unknown or empty results still allow page 1.
pub fn clamp_page(raw: &str, total_pages: u32) -> u32 {
    let upper = i64::from(total_pages.max(1));
    match parse_leading_int(raw) {
        Some(page) if page >= 1 => page.min(upper) as u32,
        _ => 1,
    }
}

/// Clamp a raw page size to `1..=max` (max itself capped at 100) / 限制每页条数
pub fn clamp_page_size(raw: &str, max: u32) -> u32 {
    let upper = i64::from(max.clamp(1, MAX_PER_PAGE));
    match parse_leading_int(raw) {
        Some(size) if size >= 1 => size.min(upper) as u32,
        _ => 1,
    }
}

pub struct SearchSession {
    keyword: String,
    page: u32,
    page_size: u32,
    max_page_size: u32,
    last_result: SearchResultPage,
    phase: Phase,
    next_token: u64,
    selected: Option<ContentItemSummary>,
    last_error: Option<SearchError>,
}

impl SearchSession {
    pub fn new(page_size: u32) -> Self {
        Self {
            keyword: String::new(),
            page: 1,
            page_size: page_size.clamp(1, MAX_PER_PAGE),
            max_page_size: MAX_PER_PAGE,
            last_result: SearchResultPage::empty(),
            phase: Phase::Idle,
            next_token: 0,
            selected: None,
            last_error: None,
        }
    }

    /// Lower the page-size cap, e.g. to what the serving index accepts
    pub fn with_max_page_size(mut self, max: u32) -> Self {
        self.max_page_size = max.clamp(1, MAX_PER_PAGE);
        self.page_size = self.page_size.min(self.max_page_size);
        self
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn last_result(&self) -> &SearchResultPage {
        &self.last_result
    }

    pub fn selected(&self) -> Option<&ContentItemSummary> {
        self.selected.as_ref()
    }

    /// Token of the query whose answer will be accepted
    pub fn pending(&self) -> Option<RequestToken> {
        match self.phase {
            Phase::Querying(token) => Some(token),
            _ => None,
        }
    }

    /// True while debouncing or waiting on the index
    pub fn is_loading(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Arm (or re-arm) debouncing; any in-flight token becomes void
    fn touch(&mut self) {
        self.phase = Phase::Debouncing;
    }

    /// New keyword; starts again from page 1. Returns whether anything changed.
    pub fn set_keyword(&mut self, keyword: impl Into<String>) -> bool {
        let keyword = keyword.into();
        if keyword == self.keyword && self.page == 1 {
            return false;
        }
        self.keyword = keyword;
        self.page = 1;
        self.touch();
        true
    }

    /// Clamp against the last known page count. Returns whether the page changed.
    pub fn set_page(&mut self, raw: &str) -> bool {
        let page = clamp_page(raw, self.last_result.total_pages);
        if page == self.page {
            return false;
        }
        self.page = page;
        self.touch();
        true
    }

    /// Clamp to `1..=max_page_size`, back to page 1. Returns whether anything changed.
    pub fn set_page_size(&mut self, raw: &str) -> bool {
        let page_size = clamp_page_size(raw, self.max_page_size);
        if page_size == self.page_size && self.page == 1 {
            return false;
        }
        self.page_size = page_size;
        self.page = 1;
        self.touch();
        true
    }

    /// The debounce timer fired / 防抖计时结束
    pub fn fire(&mut self) -> Dispatch {
        let keyword = self.keyword.trim();
        if keyword.is_empty() {
            self.phase = Phase::Idle;
            self.last_result = SearchResultPage::empty();
            self.last_error = None;
            return Dispatch::Reset;
        }

        let spec = match parse_identifier(keyword) {
            Some(id) => QuerySpec::identifier(id),
            None => QuerySpec::keyword(keyword).paged(self.page, self.page_size),
        };

        self.next_token += 1;
        let token = RequestToken(self.next_token);
        self.phase = Phase::Querying(token);
        Dispatch::Query { token, spec }
    }

    /// Accept the answer for `token` unless it has been superseded
    pub fn apply(
        &mut self,
        token: RequestToken,
        result: Result<SearchResultPage, SearchError>,
    ) -> ResponseOutcome {
        if self.phase != Phase::Querying(token) {
            return ResponseOutcome::Stale;
        }
        self.phase = Phase::Idle;

        match result {
            Ok(page) => {
                self.last_result = page;
                self.last_error = None;
                ResponseOutcome::Applied
            }
            Err(err) => {
                self.last_error = Some(err.clone());
                ResponseOutcome::Failed(err)
            }
        }
    }

    /// Pick an item of the current result set / 选择条目
    ///
    /// A missing id leaves the previous selection untouched.
    pub fn select(&mut self, id: i64) -> Result<&ContentItemSummary, SearchError> {
        let item = self
            .last_result
            .find(id)
            .cloned()
            .ok_or(SearchError::SelectionNotFound(id))?;
        Ok(self.selected.insert(item))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            keyword: self.keyword.clone(),
            page: self.page,
            page_size: self.page_size,
            total_pages: self.last_result.total_pages,
            items: self.last_result.items.clone(),
            loading: self.is_loading(),
            selected: self.selected.clone(),
            last_error: self.last_error.clone(),
        }
    }
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::schema::{Pagination, QueryTarget};

    fn page(ids: &[i64], total_pages: u32) -> SearchResultPage {
        SearchResultPage::new(
            ids.iter().map(|&id| ContentItemSummary::new(id, format!("item {}", id), "")).collect(),
            total_pages,
        )
    }

    fn query(dispatch: Dispatch) -> (RequestToken, QuerySpec) {
        match dispatch {
            Dispatch::Query { token, spec } => (token, spec),
            Dispatch::Reset => panic!("expected a query"),
        }
    }

    /// Session whose last result reports `total_pages`
    fn with_pages(total_pages: u32) -> SearchSession {
        let mut session = SearchSession::default();
        session.set_keyword("news");
        let (token, _) = query(session.fire());
        session.apply(token, Ok(page(&[1], total_pages)));
        session
    }

    #[test]
    fn test_page_size_clamps() {
        assert_eq!(clamp_page_size("0", MAX_PER_PAGE), 1);
        assert_eq!(clamp_page_size("500", MAX_PER_PAGE), 100);
        assert_eq!(clamp_page_size("abc", MAX_PER_PAGE), 1);
        assert_eq!(clamp_page_size("-3", MAX_PER_PAGE), 1);
        assert_eq!(clamp_page_size("25", MAX_PER_PAGE), 25);
        assert_eq!(clamp_page_size("25", 20), 20);
        assert_eq!(clamp_page_size("25", 500), 25);
    }

    #[test]
    fn test_page_clamps() {
        assert_eq!(clamp_page("0", 5), 1);
        assert_eq!(clamp_page("9", 5), 5);
        assert_eq!(clamp_page("abc", 5), 1);
        assert_eq!(clamp_page("3", 5), 3);
        assert_eq!(clamp_page("3", 0), 1);
    }

    #[test]
    fn test_set_page_uses_last_total_pages() {
        let mut session = with_pages(5);
        assert!(session.set_page("9"));
        assert_eq!(session.page(), 5);
        assert_eq!(session.phase(), Phase::Debouncing);
        assert!(session.set_page("0"));
        assert_eq!(session.page(), 1);
        // Same value again is not an edit
        assert!(!session.set_page("1"));
    }

    #[test]
    fn test_page_size_change_resets_page() {
        let mut session = with_pages(5);
        session.set_page("4");
        assert_eq!(session.page(), 4);
        assert!(session.set_page_size("500"));
        assert_eq!(session.page_size(), 100);
        assert_eq!(session.page(), 1);

        session.set_page("3");
        // Same size, but page still snaps back to 1
        assert!(session.set_page_size("100"));
        assert_eq!(session.page(), 1);
    }

    #[test]
    fn test_lowered_page_size_cap() {
        let mut session = SearchSession::new(50).with_max_page_size(20);
        assert_eq!(session.page_size(), 20);
        session.set_keyword("news");
        assert!(session.set_page_size("500"));
        let (_, spec) = query(session.fire());
        assert_eq!(spec.pagination, Some(Pagination::Paged { page: 1, per_page: 20 }));
    }

    #[test]
    fn test_keyword_change_resets_page() {
        let mut session = with_pages(5);
        session.set_page("3");
        session.set_keyword("other");
        assert_eq!(session.page(), 1);
        assert!(session.is_loading());
    }

    #[test]
    fn test_numeric_keyword_dispatches_identifier_lookup() {
        let mut session = SearchSession::default();
        session.set_page_size("20");
        session.set_keyword("42");
        let (_, spec) = query(session.fire());
        assert_eq!(spec.target, QueryTarget::Identifier(42));
        assert_eq!(spec.pagination, None);
    }

    #[test]
    fn test_text_keyword_dispatches_paged_search() {
        let mut session = with_pages(5);
        session.set_page_size("20");
        session.set_keyword("budget report");
        let (token, _) = query(session.fire());
        session.apply(token, Ok(page(&[1], 4)));
        session.set_page("3");
        let (_, spec) = query(session.fire());
        assert_eq!(spec.target, QueryTarget::Keyword("budget report".into()));
        assert_eq!(spec.pagination, Some(Pagination::Paged { page: 3, per_page: 20 }));
    }

    #[test]
    fn test_empty_keyword_resets_without_query() {
        let mut session = with_pages(3);
        assert!(!session.last_result().is_empty());
        session.set_keyword("   ");
        assert_eq!(session.fire(), Dispatch::Reset);
        assert!(session.last_result().is_empty());
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn test_overlapping_queries_only_latest_visible() {
        let mut session = SearchSession::default();
        session.set_keyword("alpha");
        let (a, _) = query(session.fire());
        session.set_keyword("beta");
        // The edit alone voids A
        assert_eq!(session.pending(), None);
        let (b, _) = query(session.fire());
        assert_ne!(a, b);

        assert_eq!(session.apply(b, Ok(page(&[2], 1))), ResponseOutcome::Applied);
        assert_eq!(session.apply(a, Ok(page(&[1], 1))), ResponseOutcome::Stale);
        assert_eq!(session.last_result().ids(), vec![2]);
    }

    #[test]
    fn test_response_after_edit_is_stale() {
        let mut session = SearchSession::default();
        session.set_keyword("alpha");
        let (a, _) = query(session.fire());
        session.set_keyword("alphabet");
        assert_eq!(session.apply(a, Ok(page(&[1], 1))), ResponseOutcome::Stale);
        assert_eq!(session.phase(), Phase::Debouncing);
        assert!(session.last_result().is_empty());
    }

    #[test]
    fn test_failure_keeps_previous_result() {
        let mut session = with_pages(2);
        session.set_keyword("boom");
        let (token, _) = query(session.fire());
        let err = SearchError::IndexQueryError("bad".into());
        assert_eq!(session.apply(token, Err(err.clone())), ResponseOutcome::Failed(err.clone()));
        assert_eq!(session.last_result().ids(), vec![1]);
        assert_eq!(session.snapshot().last_error, Some(err));
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn test_selection() {
        let mut session = SearchSession::default();
        session.set_keyword("news");
        let (token, _) = query(session.fire());
        session.apply(token, Ok(page(&[4, 8], 1)));

        assert_eq!(session.select(8).unwrap().id, 8);
        assert_eq!(session.select(99), Err(SearchError::SelectionNotFound(99)));
        assert_eq!(session.selected().map(|i| i.id), Some(8));
    }

    #[test]
    fn test_selection_against_replaced_results() {
        let mut session = SearchSession::default();
        assert_eq!(session.select(1), Err(SearchError::SelectionNotFound(1)));
        assert!(session.selected().is_none());

        session.set_keyword("news");
        let (token, _) = query(session.fire());
        session.apply(token, Ok(page(&[4], 1)));
        session.set_keyword("other");
        let (token, _) = query(session.fire());
        session.apply(token, Ok(page(&[5], 1)));
        assert_eq!(session.select(4), Err(SearchError::SelectionNotFound(4)));
    }

    #[test]
    fn test_snapshot() {
        let session = with_pages(7);
        let snap = session.snapshot();
        assert_eq!(snap.keyword, "news");
        assert_eq!(snap.total_pages, 7);
        assert_eq!(snap.page_size, DEFAULT_PAGE_SIZE);
        assert!(!snap.loading);
        assert_eq!(snap.items.len(), 1);
    }
}
