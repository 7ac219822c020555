//! Host wiring for the CLI
//!
//! Builds the pieces a worker runs against (disk caches, the origin, the
//! registration record, the journal) from the loaded configuration.

use crate::cache::{CacheName, DiskCacheStorage};
use crate::config::Config;
use crate::error::{SwError, SwResult};
use crate::http::Origin;
use crate::journal::Journal;
use crate::network::{Disconnected, Fetcher, HttpFetcher, StaticSite};
use crate::registration::RegistrationManager;
use crate::worker::{CacheWorker, NotificationSurface, WorkerConfig};
use std::sync::Arc;
use tracing::debug;

/// Create the network a worker fetches from
///
/// `origin.root` serves a built site from disk; otherwise requests go to
/// the origin over HTTP. `offline` makes every request fail.
pub fn create_fetcher(config: &Config, origin: &Origin, offline: bool) -> Arc<dyn Fetcher> {
    match &config.origin.root {
        Some(root) => {
            let site = StaticSite::new(root.clone(), origin.clone());
            site.set_offline(offline);
            Arc::new(site)
        }
        None if offline => Arc::new(Disconnected),
        None => Arc::new(HttpFetcher::new(origin.clone())),
    }
}

/// Everything the CLI commands share
pub struct Host {
    pub config: WorkerConfig,
    pub storage: Arc<DiskCacheStorage>,
    pub network: Arc<dyn Fetcher>,
    pub registration: RegistrationManager,
    pub journal: Journal,
}

impl Host {
    pub fn open(config: &Config) -> SwResult<Self> {
        Self::open_with(config, false)
    }

    /// Open the host, optionally with the network down
    pub fn open_with(config: &Config, offline: bool) -> SwResult<Self> {
        let worker_config = WorkerConfig::from_config(config)?;
        let network = create_fetcher(config, &worker_config.origin, offline);
        debug!("Network: {}", network.describe());

        Ok(Self {
            storage: Arc::new(DiskCacheStorage::new(config.caches_dir())),
            registration: RegistrationManager::new(
                config.state_dir(),
                worker_config.origin.to_string(),
            ),
            journal: Journal::new(config),
            network,
            config: worker_config,
        })
    }

    /// Worker for the configured version, resumed in its recorded state
    pub async fn configured_worker(
        &self,
        surface: Arc<dyn NotificationSurface>,
    ) -> SwResult<CacheWorker> {
        self.worker(self.config.clone(), surface).await
    }

    /// Worker for the version that currently controls the site
    pub async fn active_worker(
        &self,
        surface: Arc<dyn NotificationSurface>,
    ) -> SwResult<CacheWorker> {
        let registration = self.registration.load().await?;
        let active = registration.active.ok_or(SwError::NotInstalled)?;
        self.worker_for(&active.cache_name, surface).await
    }

    /// Worker for the installed version waiting to take over
    pub async fn waiting_worker(
        &self,
        surface: Arc<dyn NotificationSurface>,
    ) -> SwResult<CacheWorker> {
        let registration = self.registration.load().await?;
        let waiting = registration.waiting.ok_or(SwError::NothingWaiting)?;
        self.worker_for(&waiting.cache_name, surface).await
    }

    /// Worker for a recorded store name, e.g. `portafolio-v1.0.0`
    pub async fn worker_for(
        &self,
        cache_name: &str,
        surface: Arc<dyn NotificationSurface>,
    ) -> SwResult<CacheWorker> {
        let name = CacheName::parse(cache_name).ok_or_else(|| {
            SwError::Internal(format!("registration names an invalid cache '{}'", cache_name))
        })?;
        self.worker(self.config.for_cache(name), surface).await
    }

    async fn worker(
        &self,
        config: WorkerConfig,
        surface: Arc<dyn NotificationSurface>,
    ) -> SwResult<CacheWorker> {
        let state = self.registration.state_of(&config.cache_name()).await?;
        debug!("Resuming worker for {} as {}", config.cache_name, state);
        Ok(CacheWorker::new(config, self.storage.clone(), self.network.clone(), surface)
            .with_state(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::VersionRecord;
    use crate::worker::{RecordingSurface, WorkerState};
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.storage.dir = Some(dir.path().join("state"));
        config
    }

    #[test]
    fn static_root_serves_from_disk() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        config.origin.root = Some(dir.path().join("dist"));
        let origin = Origin::parse(&config.origin.url).unwrap();

        let fetcher = create_fetcher(&config, &origin, false);
        assert!(fetcher.describe().contains("static files"));
    }

    #[test]
    fn no_root_uses_http_or_disconnected() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir);
        let origin = Origin::parse(&config.origin.url).unwrap();

        assert!(create_fetcher(&config, &origin, false)
            .describe()
            .ends_with("(http)"));
        assert_eq!(create_fetcher(&config, &origin, true).describe(), "offline");
    }

    #[test]
    fn invalid_version_fails_to_open() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        config.worker.version = "latest".to_string();
        assert!(matches!(
            Host::open(&config),
            Err(SwError::InvalidVersion { .. })
        ));
    }

    #[tokio::test]
    async fn active_worker_requires_registration() {
        let dir = TempDir::new().unwrap();
        let host = Host::open(&config(&dir)).unwrap();
        let surface = Arc::new(RecordingSurface::new());
        assert!(matches!(
            host.active_worker(surface).await,
            Err(SwError::NotInstalled)
        ));
    }

    #[tokio::test]
    async fn workers_resume_recorded_state() {
        let dir = TempDir::new().unwrap();
        let host = Host::open(&config(&dir)).unwrap();
        host.registration
            .record_install(VersionRecord::new("portafolio-v0.9.0", "0.9.0"))
            .await
            .unwrap();
        host.registration.promote().await.unwrap();

        let surface = Arc::new(RecordingSurface::new());
        let active = host.active_worker(surface.clone()).await.unwrap();
        assert_eq!(active.config().cache_name(), "portafolio-v0.9.0");
        assert_eq!(active.state(), WorkerState::Activated);

        let configured = host.configured_worker(surface.clone()).await.unwrap();
        assert_eq!(configured.config().cache_name(), "portafolio-v1.0.0");
        assert_eq!(configured.state(), WorkerState::Parsed);

        assert!(matches!(
            host.waiting_worker(surface).await,
            Err(SwError::NothingWaiting)
        ));
    }
}
