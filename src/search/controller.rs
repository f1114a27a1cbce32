//! Incremental search controller / 增量搜索控制器
//!
//! One tokio task owns the [`SearchSession`] and handles, strictly in order:
//! user edits, the single debounce deadline, and query responses. Queries run
//! as spawned tasks that post `(token, result)` back; answers to superseded
//! queries are dropped by the session's token check.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use super::error::SearchError;
use super::index::ContentIndex;
use super::schema::{ContentItemSummary, SearchResultPage, MAX_PER_PAGE};
use super::session::{
    Dispatch, RequestToken, ResponseOutcome, SearchSession, SessionSnapshot, DEFAULT_PAGE_SIZE,
};

/// Quiet period before a query is sent / 默认防抖时间
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy)]
pub struct ControllerOptions {
    pub debounce: Duration,
    pub page_size: u32,
    /// Largest page size the index behind the controller accepts
    pub max_page_size: u32,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PER_PAGE,
        }
    }
}

enum Command {
    Keyword(String),
    Page(String),
    PageSize(String),
    Select(i64, oneshot::Sender<Result<ContentItemSummary, SearchError>>),
}

type Response = (RequestToken, Result<SearchResultPage, SearchError>);

/// Handle to one interactive search session
pub struct IncrementalSearchController {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<()>,
}

impl IncrementalSearchController {
    /// Start a session on the current tokio runtime
    pub fn spawn(index: Arc<dyn ContentIndex>, options: ControllerOptions) -> Self {
        let session =
            SearchSession::new(options.page_size).with_max_page_size(options.max_page_size);
        let (snapshot_tx, snapshots) = watch::channel(session.snapshot());
        let (commands, command_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(run_session(
            index,
            options.debounce,
            session,
            command_rx,
            snapshot_tx,
        ));

        Self { commands, snapshots, task }
    }

    fn send(&self, command: Command) -> Result<(), SearchError> {
        self.commands.send(command).map_err(|_| SearchError::ControllerClosed)
    }

    pub fn on_keyword_change(&self, keyword: impl Into<String>) -> Result<(), SearchError> {
        self.send(Command::Keyword(keyword.into()))
    }

    /// Raw page input; clamped before any query
    pub fn on_page_change(&self, raw: impl Into<String>) -> Result<(), SearchError> {
        self.send(Command::Page(raw.into()))
    }

    /// Raw page-size input; clamped, and resets the page
    pub fn on_page_size_change(&self, raw: impl Into<String>) -> Result<(), SearchError> {
        self.send(Command::PageSize(raw.into()))
    }

    /// Select an item of the current result set
    pub async fn on_select(&self, id: i64) -> Result<ContentItemSummary, SearchError> {
        let (reply, answer) = oneshot::channel();
        self.send(Command::Select(id, reply))?;
        answer.await.map_err(|_| SearchError::ControllerClosed)?
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified after every processed event
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }
}

impl Drop for IncrementalSearchController {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_session(
    index: Arc<dyn ContentIndex>,
    debounce: Duration,
    mut session: SearchSession,
    mut commands: mpsc::UnboundedReceiver<Command>,
    snapshots: watch::Sender<SessionSnapshot>,
) {
    let (response_tx, mut responses) = mpsc::unbounded_channel::<Response>();
    // The one debounce timer; re-arming replaces it
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else { break };
                let edited = match command {
                    Command::Keyword(keyword) => session.set_keyword(keyword),
                    Command::Page(raw) => session.set_page(&raw),
                    Command::PageSize(raw) => session.set_page_size(&raw),
                    Command::Select(id, reply) => {
                        let result = session.select(id).cloned();
                        if let Err(e) = &result {
                            tracing::debug!("Selection rejected: {}", e);
                        }
                        let _ = reply.send(result);
                        false
                    }
                };
                if edited {
                    deadline = Some(Instant::now() + debounce);
                }
            }
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                deadline = None;
                match session.fire() {
                    Dispatch::Reset => {
                        tracing::debug!("Empty keyword, restored default results");
                    }
                    Dispatch::Query { token, spec } => {
                        tracing::debug!("Dispatching {:?} as {:?}", spec.target, token);
                        let index = index.clone();
                        let response_tx = response_tx.clone();
                        tokio::spawn(async move {
                            let result = index.query(&spec).await;
                            // The session may be gone; nothing to do then
                            let _ = response_tx.send((token, result));
                        });
                    }
                }
            }
            Some((token, result)) = responses.recv() => {
                match session.apply(token, result) {
                    ResponseOutcome::Applied => {
                        tracing::debug!("Applied response {:?}", token);
                    }
                    ResponseOutcome::Failed(e) => {
                        tracing::warn!("Search on {} index failed: {}", index.name(), e);
                    }
                    ResponseOutcome::Stale => {
                        tracing::debug!("Discarded stale response {:?}", token);
                    }
                }
            }
        }

        snapshots.send_replace(session.snapshot());
    }
}
