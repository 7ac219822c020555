//! In-memory cache storage

use super::CacheStorage;
use crate::error::{SwError, SwResult};
use crate::http::{RequestKey, Response};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Cache storage held in process memory
///
/// Stores keep their creation order so cross-store lookups are
/// deterministic. Deletes and writes can be made to fail for exercising
/// the worker's degraded paths.
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    stores: RwLock<Vec<(String, HashMap<RequestKey, Response>)>>,
    failing_deletes: HashSet<String>,
    fail_writes: AtomicBool,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every delete of `name` fail
    pub fn with_failing_delete(mut self, name: &str) -> Self {
        self.failing_deletes.insert(name.to_string());
        self
    }

    /// Make every subsequent `put`/`put_all` fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self, name: &str) -> SwResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SwError::storage(name, "write rejected"));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> SwResult<()> {
        let mut stores = self.stores.write().await;
        if !stores.iter().any(|(n, _)| n == name) {
            stores.push((name.to_string(), HashMap::new()));
        }
        Ok(())
    }

    async fn has(&self, name: &str) -> SwResult<bool> {
        Ok(self.stores.read().await.iter().any(|(n, _)| n == name))
    }

    async fn keys(&self) -> SwResult<Vec<String>> {
        Ok(self
            .stores
            .read()
            .await
            .iter()
            .map(|(n, _)| n.clone())
            .collect())
    }

    async fn delete(&self, name: &str) -> SwResult<bool> {
        if self.failing_deletes.contains(name) {
            return Err(SwError::storage(name, "delete rejected"));
        }
        let mut stores = self.stores.write().await;
        let before = stores.len();
        stores.retain(|(n, _)| n != name);
        Ok(stores.len() != before)
    }

    async fn match_in(&self, name: &str, key: &RequestKey) -> SwResult<Option<Response>> {
        let stores = self.stores.read().await;
        Ok(stores
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, entries)| entries.get(key).cloned()))
    }

    async fn put(&self, name: &str, key: &RequestKey, response: &Response) -> SwResult<()> {
        self.check_writable(name)?;
        let mut stores = self.stores.write().await;
        match stores.iter_mut().find(|(n, _)| n == name) {
            Some((_, entries)) => {
                entries.insert(key.clone(), response.clone());
            }
            None => {
                let mut entries = HashMap::new();
                entries.insert(key.clone(), response.clone());
                stores.push((name.to_string(), entries));
            }
        }
        Ok(())
    }

    async fn put_all(&self, name: &str, entries: &[(RequestKey, Response)]) -> SwResult<()> {
        self.check_writable(name)?;
        // Single write lock: the whole batch lands at once
        let mut stores = self.stores.write().await;
        let index = match stores.iter().position(|(n, _)| n == name) {
            Some(i) => i,
            None => {
                stores.push((name.to_string(), HashMap::new()));
                stores.len() - 1
            }
        };
        let store = &mut stores[index].1;
        for (key, response) in entries {
            store.insert(key.clone(), response.clone());
        }
        Ok(())
    }

    async fn entries(&self, name: &str) -> SwResult<Vec<RequestKey>> {
        let stores = self.stores.read().await;
        let (_, entries) = stores
            .iter()
            .find(|(n, _)| n == name)
            .ok_or_else(|| SwError::CacheNotFound(name.to_string()))?;
        let mut keys: Vec<RequestKey> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
