//! The offline cache worker
//!
//! One [`CacheWorker`] is one deployed version of the worker. It pre-caches
//! the manifest on install, purges every other version's store on
//! activation, and then answers fetches cache-first:
//!
//! | Cache | Network | Destination | Page gets |
//! |-------|---------|-------------|-----------|
//! | hit | not consulted | any | cached response |
//! | miss | response | any | network response (stored if 200 + basic) |
//! | miss | failed | document | offline page from cache |
//! | miss | failed | other | nothing |

pub mod config;
pub mod event;
pub mod notification;
pub mod state;
pub mod writes;

pub use config::{PushSettings, WorkerConfig};
pub use event::{
    ActivationReport, ClickOutcome, EventOutcome, FetchResult, FetchSource, InstallReport,
    MessageOutcome, WorkerEvent,
};
pub use notification::{Notification, NotificationSurface, RecordingSurface};
pub use state::WorkerState;
pub use writes::{WriteFailure, WriteReport};

use crate::cache::CacheStorage;
use crate::error::{SwError, SwResult};
use crate::http::{Request, RequestKey, Response};
use crate::network::Fetcher;
use futures_util::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;
use writes::BackgroundWrites;

/// One version of the offline cache worker
pub struct CacheWorker {
    id: Uuid,
    config: WorkerConfig,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Fetcher>,
    surface: Arc<dyn NotificationSurface>,
    state: watch::Sender<WorkerState>,
    skip_waiting: AtomicBool,
    writes: BackgroundWrites,
}

impl CacheWorker {
    /// Create a worker in the `Parsed` state
    pub fn new(
        config: WorkerConfig,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Fetcher>,
        surface: Arc<dyn NotificationSurface>,
    ) -> Self {
        let (state, _) = watch::channel(WorkerState::Parsed);
        Self {
            id: Uuid::new_v4(),
            config,
            storage,
            network,
            surface,
            state,
            skip_waiting: AtomicBool::new(false),
            writes: BackgroundWrites::new(),
        }
    }

    /// Resume a version whose lifecycle progressed in an earlier run
    pub fn with_state(self, state: WorkerState) -> Self {
        self.state.send_replace(state);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<WorkerState> {
        self.state.subscribe()
    }

    /// Whether a page asked this worker to stop waiting
    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    fn set_state(&self, state: WorkerState) {
        let old = self.state.send_replace(state);
        if old != state {
            debug!("Worker {} ({}): {} -> {}", self.id, self.config.cache_name, old, state);
        }
    }

    /// Route an event to its handler
    pub async fn dispatch(&self, event: WorkerEvent) -> SwResult<EventOutcome> {
        debug!("Dispatching {} event", event.kind());
        match event {
            WorkerEvent::Install => self.install().await.map(EventOutcome::Installed),
            WorkerEvent::Activate => self.activate().await.map(EventOutcome::Activated),
            WorkerEvent::Fetch(request) => Ok(EventOutcome::Fetched(self.handle_fetch(request).await)),
            WorkerEvent::Message(data) => Ok(EventOutcome::Message(self.handle_message(&data))),
            WorkerEvent::Push(payload) => self
                .handle_push(payload.as_deref())
                .await
                .map(EventOutcome::Pushed),
            WorkerEvent::NotificationClick { tag, action } => self
                .handle_notification_click(&tag, action.as_deref())
                .await
                .map(EventOutcome::Clicked),
        }
    }

    /// Pre-cache the manifest into this version's store
    ///
    /// All-or-nothing: if any path cannot be fetched or is not a 2xx, no
    /// entry is written and the worker becomes `Redundant`.
    pub async fn install(&self) -> SwResult<InstallReport> {
        let state = self.state();
        if !state.can_install() {
            return Err(SwError::InvalidState {
                operation: "install".to_string(),
                state: state.to_string(),
            });
        }
        self.set_state(WorkerState::Installing);

        match self.precache().await {
            Ok(report) => {
                self.set_state(WorkerState::Installed);
                info!(
                    "Installed {} ({} entries pre-cached)",
                    report.cache_name,
                    report.cached.len()
                );
                Ok(report)
            }
            Err(e) => {
                self.set_state(WorkerState::Redundant);
                error!("Install of {} failed: {}", self.config.cache_name, e);
                Err(e)
            }
        }
    }

    async fn precache(&self) -> SwResult<InstallReport> {
        let cache_name = self.config.cache_name();
        self.storage.open(&cache_name).await?;

        let requests: Vec<(String, Request)> = self
            .config
            .precache
            .iter()
            .map(|path| (path.clone(), Request::get(self.config.resolve(path))))
            .collect();

        let fetched = join_all(requests.iter().map(|(_, req)| self.network.fetch(req))).await;

        let mut entries: Vec<(RequestKey, Response)> = Vec::with_capacity(requests.len());
        for ((path, request), result) in requests.iter().zip(fetched) {
            let response = result.map_err(|e| SwError::InstallFailed {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            if !response.ok() {
                return Err(SwError::InstallFailed {
                    path: path.clone(),
                    reason: format!("status {}", response.status),
                });
            }
            entries.push((request.key(), response));
        }

        self.storage
            .put_all(&cache_name, &entries)
            .await
            .map_err(|e| SwError::InstallFailed {
                path: cache_name.clone(),
                reason: e.to_string(),
            })?;

        Ok(InstallReport {
            cache_name,
            cached: entries.into_iter().map(|(key, _)| key.url).collect(),
        })
    }

    /// Delete every store except this version's
    ///
    /// Deletions run concurrently; a failed deletion is logged and reported
    /// but never fails activation.
    pub async fn activate(&self) -> SwResult<ActivationReport> {
        let state = self.state();
        if !state.can_activate() {
            return Err(SwError::InvalidState {
                operation: "activate".to_string(),
                state: state.to_string(),
            });
        }
        self.set_state(WorkerState::Activating);

        let current = self.config.cache_name();
        let names = match self.storage.keys().await {
            Ok(names) => names,
            Err(e) => {
                warn!("Could not list caches during activation: {}", e);
                vec![]
            }
        };

        let stale: Vec<String> = names.into_iter().filter(|n| *n != current).collect();
        let results = join_all(stale.iter().map(|name| async move {
            info!("Deleting old cache: {}", name);
            (name.clone(), self.storage.delete(name).await)
        }))
        .await;

        let mut report = ActivationReport {
            cache_name: current,
            ..Default::default()
        };
        for (name, result) in results {
            match result {
                Ok(_) => report.purged.push(name),
                Err(e) => {
                    warn!("Failed to delete old cache {}: {}", name, e);
                    report.failed.push((name, e.to_string()));
                }
            }
        }

        self.set_state(WorkerState::Activated);
        info!(
            "Activated {} ({} old caches purged)",
            report.cache_name,
            report.purged.len()
        );
        Ok(report)
    }

    /// Answer a request cache-first
    pub async fn handle_fetch(&self, request: Request) -> FetchResult {
        let request = self.absolutize(request);
        let key = request.key();

        match self.storage.match_request(&key).await {
            Ok(Some(response)) => {
                debug!("{} served from cache", key);
                return FetchResult {
                    response: Some(response),
                    source: FetchSource::Cache,
                };
            }
            Ok(None) => {}
            Err(e) => warn!("Cache lookup for {} failed, going to network: {}", key, e),
        }

        match self.network.fetch(&request).await {
            Ok(response) => {
                let stored = request.method == "GET" && response.is_cacheable();
                if stored {
                    self.writes
                        .spawn(
                            self.storage.clone(),
                            self.config.cache_name(),
                            key,
                            response.clone(),
                        )
                        .await;
                } else {
                    debug!(
                        "{} not cached (status {}, type {})",
                        key, response.status, response.response_type
                    );
                }
                FetchResult {
                    response: Some(response),
                    source: FetchSource::Network { stored },
                }
            }
            Err(e) if request.destination.is_navigation() => {
                debug!("Navigation to {} failed ({}), trying offline page", key, e);
                self.offline_fallback().await
            }
            Err(e) => {
                debug!("{} failed with no fallback: {}", key, e);
                FetchResult::miss()
            }
        }
    }

    async fn offline_fallback(&self) -> FetchResult {
        let key = RequestKey::get(self.config.resolve(&self.config.offline_fallback));
        match self.storage.match_request(&key).await {
            Ok(Some(response)) => FetchResult {
                response: Some(response),
                source: FetchSource::OfflineFallback,
            },
            Ok(None) => {
                warn!("Offline page {} is not cached", key.url);
                FetchResult::miss()
            }
            Err(e) => {
                warn!("Offline page lookup failed: {}", e);
                FetchResult::miss()
            }
        }
    }

    fn absolutize(&self, mut request: Request) -> Request {
        if request.url.starts_with('/') {
            request.url = self.config.resolve(&request.url);
        }
        request
    }

    /// Wait for background cache writes and report their outcome
    pub async fn settle(&self) -> WriteReport {
        self.writes.settle().await
    }

    /// Handle a control message; only the skip-waiting message is understood
    pub fn handle_message(&self, data: &serde_json::Value) -> MessageOutcome {
        let kind = data.get("type").and_then(serde_json::Value::as_str);
        if kind == Some(self.config.skip_waiting_message.as_str()) {
            self.skip_waiting.store(true, Ordering::SeqCst);
            info!("Skip-waiting requested for {}", self.config.cache_name);
            MessageOutcome::SkipWaiting
        } else {
            debug!("Ignoring message {}", data);
            MessageOutcome::Ignored
        }
    }

    /// Show a notification for a push
    pub async fn handle_push(&self, payload: Option<&str>) -> SwResult<Notification> {
        let notification = Notification::from_push(&self.config.push, payload);
        self.surface.show(&notification).await?;
        debug!("Showed notification {}", notification.tag);
        Ok(notification)
    }

    /// Close the clicked notification, opening the site unless it was dismissed
    pub async fn handle_notification_click(
        &self,
        tag: &str,
        action: Option<&str>,
    ) -> SwResult<ClickOutcome> {
        self.surface.close(tag).await?;

        if action == Some(notification::ACTION_CLOSE) {
            return Ok(ClickOutcome::Dismissed);
        }

        let url = self.config.resolve(&self.config.push.open_url);
        self.surface.open_window(&url).await?;
        Ok(ClickOutcome::Opened(url))
    }
}
