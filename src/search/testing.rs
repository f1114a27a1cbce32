//! Scripted in-memory index for tests / 测试用索引

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::error::SearchError;
use super::index::ContentIndex;
use super::schema::{QuerySpec, QueryTarget, SearchResultPage};

struct Scripted {
    result: Result<SearchResultPage, SearchError>,
    delay: Duration,
}

/// Answers by target text (keyword, marker or id), records every spec
pub struct FakeIndex {
    default: SearchResultPage,
    failure: Option<SearchError>,
    scripted: HashMap<String, Scripted>,
    specs: Mutex<Vec<QuerySpec>>,
    completed: AtomicUsize,
}

impl FakeIndex {
    pub fn new() -> Self {
        Self {
            default: SearchResultPage::empty(),
            failure: None,
            scripted: HashMap::new(),
            specs: Mutex::new(Vec::new()),
            completed: AtomicUsize::new(0),
        }
    }

    pub fn with_default(mut self, page: SearchResultPage) -> Self {
        self.default = page;
        self
    }

    /// Fail every unscripted query
    pub fn failing_with(mut self, err: SearchError) -> Self {
        self.failure = Some(err);
        self
    }

    pub fn respond(mut self, key: &str, page: SearchResultPage, delay: Duration) -> Self {
        self.scripted.insert(key.to_string(), Scripted { result: Ok(page), delay });
        self
    }

    pub fn fail(mut self, key: &str, err: SearchError) -> Self {
        self.scripted.insert(key.to_string(), Scripted { result: Err(err), delay: Duration::ZERO });
        self
    }

    /// Queries started
    pub fn calls(&self) -> usize {
        self.specs.lock().len()
    }

    /// Queries that returned
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn last_spec(&self) -> Option<QuerySpec> {
        self.specs.lock().last().cloned()
    }
}

impl Default for FakeIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentIndex for FakeIndex {
    async fn query(&self, spec: &QuerySpec) -> Result<SearchResultPage, SearchError> {
        self.specs.lock().push(spec.clone());

        let key = match &spec.target {
            QueryTarget::Marker(m) => m.clone(),
            QueryTarget::Keyword(k) => k.clone(),
            QueryTarget::Identifier(id) => id.to_string(),
        };

        let result = match self.scripted.get(&key) {
            Some(scripted) => {
                if !scripted.delay.is_zero() {
                    tokio::time::sleep(scripted.delay).await;
                }
                scripted.result.clone()
            }
            None => match &self.failure {
                Some(err) => Err(err.clone()),
                None => Ok(self.default.clone()),
            },
        };

        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }

    fn name(&self) -> &str {
        "fake"
    }
}
