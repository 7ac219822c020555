//! On-disk cache storage
//!
//! Layout under the storage root:
//!
//! ```text
//! order.json                    store names in creation order
//! <store>/<digest>.json         request key, response metadata, cached_at
//! <store>/<digest>.body         raw response body
//! .staging-<uuid>/              batch being written by put_all
//! .staging-<uuid>/.replaced/    entries a batch overwrote, kept until it commits
//! ```
//!
//! `<digest>` is the hex SHA-256 of the request identity. A batch is staged
//! in full, then renamed into the store; a rename that fails rolls back the
//! ones before it.

use super::CacheStorage;
use crate::error::{SwError, SwResult};
use crate::http::{RequestKey, Response};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const ORDER_FILE: &str = "order.json";

/// Metadata file written next to each body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEntry {
    pub key: RequestKey,
    pub response: Response,
    pub cached_at: DateTime<Utc>,
}

/// Cache storage persisted in a directory, one sub-directory per store
pub struct DiskCacheStorage {
    root: PathBuf,
    /// Serializes updates to the store index
    index_lock: Mutex<()>,
}

impl DiskCacheStorage {
    /// Use `root` as the storage directory (created lazily)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn store_dir(&self, name: &str) -> SwResult<PathBuf> {
        validate_store_name(name)?;
        Ok(self.root.join(name))
    }

    async fn read_order(&self) -> SwResult<Vec<String>> {
        let path = self.root.join(ORDER_FILE);
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(vec![]),
            Err(e) => Err(SwError::io(format!("reading {}", path.display()), e)),
        }
    }

    async fn write_order(&self, order: &[String]) -> SwResult<()> {
        let content = serde_json::to_string_pretty(order)?;
        write_atomic(&self.root.join(ORDER_FILE), content.as_bytes()).await
    }

    /// Metadata for every entry of a store
    pub async fn stored_entries(&self, name: &str) -> SwResult<Vec<StoredEntry>> {
        let dir = self.store_dir(name)?;
        if !is_dir(&dir).await {
            return Err(SwError::CacheNotFound(name.to_string()));
        }

        let mut entries = vec![];
        let mut read_dir = fs::read_dir(&dir)
            .await
            .map_err(|e| SwError::io(format!("reading cache directory {}", dir.display()), e))?;

        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| SwError::io("reading cache entry", e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                let content = fs::read_to_string(&path).await.ok();
                match content.map(|c| serde_json::from_str::<StoredEntry>(&c)) {
                    Some(Ok(stored)) => entries.push(stored),
                    _ => warn!("Skipping unreadable cache entry {}", path.display()),
                }
            }
        }

        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    /// Write the body then the metadata of one entry into `dir`
    async fn write_entry(dir: &Path, key: &RequestKey, response: &Response) -> SwResult<()> {
        let digest = key.digest();
        let stored = StoredEntry {
            key: key.clone(),
            response: response.clone(),
            cached_at: Utc::now(),
        };
        write_atomic(&dir.join(format!("{}.body", digest)), &response.body).await?;
        let meta = serde_json::to_vec_pretty(&stored)?;
        write_atomic(&dir.join(format!("{}.json", digest)), &meta).await
    }

    /// Stage every entry, then move them into the store
    async fn stage_and_commit(
        &self,
        name: &str,
        staging: &Path,
        entries: &[(RequestKey, Response)],
    ) -> SwResult<()> {
        Self::ensure_dir(staging).await?;
        for (key, response) in entries {
            Self::write_entry(staging, key, response)
                .await
                .map_err(|e| SwError::storage(name, e.to_string()))?;
        }

        self.open(name).await?;
        let dir = self.store_dir(name)?;

        let mut staged = vec![];
        let mut read_dir = fs::read_dir(staging)
            .await
            .map_err(|e| SwError::io("reading staging directory", e))?;
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| SwError::io("reading staged entry", e))?
        {
            if entry.file_type().await.is_ok_and(|t| t.is_file()) {
                staged.push(entry.path());
            }
        }
        // Bodies first so a visible .json always has its body
        staged.sort_by_key(|p| p.extension().is_some_and(|ext| ext == "json"));

        let mut commit = Commit::new(staging.join(".replaced"));
        for path in staged {
            let Some(file_name) = path.file_name() else {
                continue;
            };
            if let Err(e) = commit.move_in(&path, dir.join(file_name)).await {
                warn!("Commit to {} failed, rolling back: {}", name, e);
                commit.roll_back().await;
                return Err(SwError::storage(name, e.to_string()));
            }
        }
        Ok(())
    }

    async fn ensure_dir(dir: &Path) -> SwResult<()> {
        fs::create_dir_all(dir)
            .await
            .map_err(|e| SwError::io(format!("creating cache directory {}", dir.display()), e))
    }
}

#[async_trait]
impl CacheStorage for DiskCacheStorage {
    async fn open(&self, name: &str) -> SwResult<()> {
        let dir = self.store_dir(name)?;
        let _guard = self.index_lock.lock().await;

        Self::ensure_dir(&dir).await?;
        let mut order = self.read_order().await?;
        if !order.iter().any(|n| n == name) {
            order.push(name.to_string());
            self.write_order(&order).await?;
            debug!("Opened cache store {}", name);
        }
        Ok(())
    }

    async fn has(&self, name: &str) -> SwResult<bool> {
        Ok(is_dir(&self.store_dir(name)?).await)
    }

    async fn keys(&self) -> SwResult<Vec<String>> {
        if !is_dir(&self.root).await {
            return Ok(vec![]);
        }

        let mut names = vec![];
        for name in self.read_order().await? {
            if is_dir(&self.root.join(&name)).await {
                names.push(name);
            }
        }

        // Directories created outside this process (or before the index existed)
        let mut unindexed = vec![];
        let mut read_dir = fs::read_dir(&self.root)
            .await
            .map_err(|e| SwError::io("reading cache storage root", e))?;
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| SwError::io("reading cache storage entry", e))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_store = entry.file_type().await.is_ok_and(|t| t.is_dir());
            if is_store && !name.starts_with('.') && !names.contains(&name) {
                unindexed.push(name);
            }
        }
        unindexed.sort();
        names.extend(unindexed);
        Ok(names)
    }

    async fn delete(&self, name: &str) -> SwResult<bool> {
        let dir = self.store_dir(name)?;
        let _guard = self.index_lock.lock().await;

        let existed = is_dir(&dir).await;
        if existed {
            fs::remove_dir_all(&dir)
                .await
                .map_err(|e| SwError::storage(name, e.to_string()))?;
        }

        let mut order = self.read_order().await?;
        let before = order.len();
        order.retain(|n| n != name);
        if order.len() != before {
            self.write_order(&order).await?;
        }
        Ok(existed)
    }

    async fn match_in(&self, name: &str, key: &RequestKey) -> SwResult<Option<Response>> {
        let dir = self.store_dir(name)?;
        let digest = key.digest();
        let meta_path = dir.join(format!("{}.json", digest));
        let meta = match fs::read_to_string(&meta_path).await {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SwError::io(format!("reading {}", meta_path.display()), e)),
        };
        let stored: StoredEntry = serde_json::from_str(&meta)?;
        if stored.key != *key {
            // Digest collision or a hand-edited file; never serve the wrong entry
            return Ok(None);
        }

        let body_path = dir.join(format!("{}.body", digest));
        let body = fs::read(&body_path)
            .await
            .map_err(|e| SwError::io(format!("reading {}", body_path.display()), e))?;

        let mut response = stored.response;
        response.body = body;
        Ok(Some(response))
    }

    async fn put(&self, name: &str, key: &RequestKey, response: &Response) -> SwResult<()> {
        self.open(name).await?;
        let dir = self.store_dir(name)?;
        Self::write_entry(&dir, key, response)
            .await
            .map_err(|e| SwError::storage(name, e.to_string()))
    }

    async fn put_all(&self, name: &str, entries: &[(RequestKey, Response)]) -> SwResult<()> {
        self.store_dir(name)?;
        let staging = self
            .root
            .join(format!(".staging-{}", uuid::Uuid::new_v4()));

        let result = self.stage_and_commit(name, &staging, entries).await;
        match fs::remove_dir_all(&staging).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Could not remove {}: {}", staging.display(), e),
        }

        result?;
        debug!("Committed {} entries to {}", entries.len(), name);
        Ok(())
    }

    async fn entries(&self, name: &str) -> SwResult<Vec<RequestKey>> {
        Ok(self
            .stored_entries(name)
            .await?
            .into_iter()
            .map(|e| e.key)
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "disk"
    }
}

/// Renames made by one batch commit, undone in reverse on failure
struct Commit {
    replaced_dir: PathBuf,
    moved: Vec<(PathBuf, Option<PathBuf>)>,
}

impl Commit {
    fn new(replaced_dir: PathBuf) -> Self {
        Self {
            replaced_dir,
            moved: vec![],
        }
    }

    /// Move a staged file to `target`, setting aside any file it replaces
    async fn move_in(&mut self, staged: &Path, target: PathBuf) -> std::io::Result<()> {
        let replaced = match fs::symlink_metadata(&target).await {
            Ok(meta) if meta.is_file() => {
                fs::create_dir_all(&self.replaced_dir).await?;
                let aside = self.replaced_dir.join(self.moved.len().to_string());
                fs::rename(&target, &aside).await?;
                Some(aside)
            }
            _ => None,
        };

        if let Err(e) = fs::rename(staged, &target).await {
            if let Some(aside) = replaced {
                if let Err(e) = fs::rename(&aside, &target).await {
                    warn!("Could not restore {}: {}", target.display(), e);
                }
            }
            return Err(e);
        }
        self.moved.push((target, replaced));
        Ok(())
    }

    async fn roll_back(self) {
        for (target, replaced) in self.moved.into_iter().rev() {
            let undone = match replaced {
                Some(aside) => fs::rename(&aside, &target).await,
                None => fs::remove_file(&target).await,
            };
            if let Err(e) = undone {
                warn!("Could not roll back {}: {}", target.display(), e);
            }
        }
    }
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

/// Store names become directory names
fn validate_store_name(name: &str) -> SwResult<()> {
    if name.is_empty()
        || name.starts_with('.')
        || name.contains('/')
        || name.contains('\\')
        || name == ORDER_FILE
    {
        return Err(SwError::storage(name, "invalid cache name"));
    }
    Ok(())
}

/// Write via a temp file and rename
async fn write_atomic(path: &Path, bytes: &[u8]) -> SwResult<()> {
    if let Some(parent) = path.parent() {
        DiskCacheStorage::ensure_dir(parent).await?;
    }
    let temp_path = path.with_extension(format!("tmp-{}", uuid::Uuid::new_v4().simple()));
    fs::write(&temp_path, bytes)
        .await
        .map_err(|e| SwError::io(format!("writing {}", temp_path.display()), e))?;
    fs::rename(&temp_path, path)
        .await
        .map_err(|e| SwError::io(format!("renaming to {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ResponseType;
    use tempfile::TempDir;

    fn html(url: &str, body: &str) -> Response {
        Response::new(url, 200, body).with_header("content-type", "text/html")
    }

    #[tokio::test]
    async fn put_and_match_preserves_response() {
        let dir = TempDir::new().unwrap();
        let storage = DiskCacheStorage::new(dir.path());
        let key = RequestKey::get("https://example.com/index.html");
        let response = html(&key.url, "<h1>hola</h1>");

        storage.put("portafolio-v1.0.0", &key, &response).await.unwrap();
        let hit = storage
            .match_in("portafolio-v1.0.0", &key)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(hit, response);
        assert_eq!(hit.response_type, ResponseType::Basic);
    }

    #[tokio::test]
    async fn keys_follow_creation_order() {
        let dir = TempDir::new().unwrap();
        let storage = DiskCacheStorage::new(dir.path());
        storage.open("portafolio-v1.0.0").await.unwrap();
        storage.open("portafolio-v0.9.0").await.unwrap();
        storage.open("portafolio-v1.0.0").await.unwrap();

        assert_eq!(
            storage.keys().await.unwrap(),
            vec!["portafolio-v1.0.0", "portafolio-v0.9.0"]
        );
    }

    #[tokio::test]
    async fn keys_include_unindexed_directories() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("legacy")).unwrap();
        std::fs::create_dir_all(dir.path().join(".staging-x")).unwrap();
        let storage = DiskCacheStorage::new(dir.path());
        storage.open("current").await.unwrap();

        assert_eq!(storage.keys().await.unwrap(), vec!["current", "legacy"]);
    }

    #[tokio::test]
    async fn delete_removes_store_and_index_entry() {
        let dir = TempDir::new().unwrap();
        let storage = DiskCacheStorage::new(dir.path());
        storage.open("old").await.unwrap();

        assert!(storage.delete("old").await.unwrap());
        assert!(!storage.delete("old").await.unwrap());
        assert!(storage.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn put_all_commits_every_entry() {
        let dir = TempDir::new().unwrap();
        let storage = DiskCacheStorage::new(dir.path());
        let entries = pages(&["/", "/index.html", "/manifest.json"]);

        storage.put_all("c", &entries).await.unwrap();

        assert_eq!(storage.entries("c").await.unwrap().len(), 3);
        assert_eq!(staging_dirs(dir.path()), 0);
    }

    fn pages(paths: &[&str]) -> Vec<(RequestKey, Response)> {
        paths
            .iter()
            .map(|p| {
                let url = format!("https://example.com{}", p);
                (RequestKey::get(url.clone()), html(&url, p))
            })
            .collect()
    }

    fn staging_dirs(root: &Path) -> usize {
        std::fs::read_dir(root)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".staging"))
            .count()
    }

    #[tokio::test]
    async fn failed_commit_leaves_no_entries() {
        let dir = TempDir::new().unwrap();
        let storage = DiskCacheStorage::new(dir.path());
        let entries = pages(&[
            "/",
            "/index.html",
            "/manifest.json",
            "/favicon.ico",
            "/icon-192x192.png",
            "/icon-512x512.png",
        ]);
        storage.open("c").await.unwrap();
        // A directory where the last metadata file must go
        let blocked = format!("{}.json", entries[5].0.digest());
        std::fs::create_dir_all(dir.path().join("c").join(blocked)).unwrap();

        assert!(storage.put_all("c", &entries).await.is_err());

        assert!(storage.entries("c").await.unwrap().is_empty());
        for (key, _) in &entries[..5] {
            assert!(storage.match_in("c", key).await.unwrap().is_none());
        }
        assert_eq!(staging_dirs(dir.path()), 0);
    }

    #[tokio::test]
    async fn failed_commit_restores_replaced_entries() {
        let dir = TempDir::new().unwrap();
        let storage = DiskCacheStorage::new(dir.path());
        let old = pages(&["/"]);
        storage.put("c", &old[0].0, &html(&old[0].0.url, "old")).await.unwrap();

        let mut batch = pages(&["/", "/index.html"]);
        batch[0].1 = html(&batch[0].0.url, "new");
        let blocked = format!("{}.json", batch[1].0.digest());
        std::fs::create_dir_all(dir.path().join("c").join(blocked)).unwrap();

        assert!(storage.put_all("c", &batch).await.is_err());

        let hit = storage.match_in("c", &old[0].0).await.unwrap().unwrap();
        assert_eq!(hit.body, b"old".to_vec());
        assert_eq!(staging_dirs(dir.path()), 0);
    }

    #[tokio::test]
    async fn match_missing_entry_is_none() {
        let dir = TempDir::new().unwrap();
        let storage = DiskCacheStorage::new(dir.path());
        storage.open("c").await.unwrap();
        assert!(storage
            .match_in("c", &RequestKey::get("https://example.com/nope"))
            .await
            .unwrap()
            .is_none());
        assert!(storage
            .match_request(&RequestKey::get("https://example.com/nope"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn rejects_path_like_names() {
        let dir = TempDir::new().unwrap();
        let storage = DiskCacheStorage::new(dir.path());
        assert!(storage.open("../escape").await.is_err());
        assert!(storage.open(".hidden").await.is_err());
    }

    #[tokio::test]
    async fn empty_root_has_no_keys() {
        let dir = TempDir::new().unwrap();
        let storage = DiskCacheStorage::new(dir.path().join("missing"));
        assert!(storage.keys().await.unwrap().is_empty());
    }
}
