//! Detached cache writes
//!
//! A fetch hands its response to the page without waiting for the cache
//! write. Writes run as spawned tasks; their failures are logged when they
//! happen and collected here so they are never lost silently.

use crate::cache::CacheStorage;
use crate::http::{RequestKey, Response};
use futures_util::future::join_all;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A background cache write that did not land
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteFailure {
    pub cache_name: String,
    pub key: RequestKey,
    pub reason: String,
}

/// Outcome of every write started since the last settle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub completed: Vec<RequestKey>,
    pub failed: Vec<WriteFailure>,
}

impl WriteReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

type WriteTask = JoinHandle<Result<RequestKey, WriteFailure>>;

/// Tracks in-flight background writes
#[derive(Default)]
pub struct BackgroundWrites {
    pending: Mutex<Vec<(RequestKey, String, WriteTask)>>,
}

impl BackgroundWrites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start writing `response` under `key` without waiting for it
    pub async fn spawn(
        &self,
        storage: Arc<dyn CacheStorage>,
        cache_name: String,
        key: RequestKey,
        response: Response,
    ) {
        let task_key = key.clone();
        let task_cache = cache_name.clone();
        let handle = tokio::spawn(async move {
            match storage.put(&task_cache, &task_key, &response).await {
                Ok(()) => {
                    debug!("Cached {} in {}", task_key, task_cache);
                    Ok(task_key)
                }
                Err(e) => {
                    warn!("Background cache write for {} failed: {}", task_key, e);
                    Err(WriteFailure {
                        cache_name: task_cache,
                        key: task_key,
                        reason: e.to_string(),
                    })
                }
            }
        });
        self.pending.lock().await.push((key, cache_name, handle));
    }

    /// Number of writes not yet settled
    pub async fn pending(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Wait for every write started so far and report how they ended
    pub async fn settle(&self) -> WriteReport {
        let pending = std::mem::take(&mut *self.pending.lock().await);
        let (meta, handles): (Vec<_>, Vec<_>) = pending
            .into_iter()
            .map(|(key, cache, handle)| ((key, cache), handle))
            .unzip();

        let mut report = WriteReport::default();
        for ((key, cache_name), joined) in meta.into_iter().zip(join_all(handles).await) {
            match joined {
                Ok(Ok(key)) => report.completed.push(key),
                Ok(Err(failure)) => report.failed.push(failure),
                Err(e) => {
                    warn!("Background cache write for {} aborted: {}", key, e);
                    report.failed.push(WriteFailure {
                        cache_name,
                        key,
                        reason: e.to_string(),
                    });
                }
            }
        }
        report
    }
}
